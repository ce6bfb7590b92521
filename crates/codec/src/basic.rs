//! Codec implementations for the data-model primitives in `ledger-core`.

use std::collections::BTreeSet;

use ledger_core::{Acl, DbName, Flag, Key, Metadata, UserId, Version};

use crate::codec_trait::{decode_vec, encode_vec, Codec};
use crate::primitives::{
    decode_bytes, decode_str, decode_tag, decode_u64, encode_bytes, encode_str, encode_tag,
    encode_u64,
};
use crate::{CodecError, CodecResult};

impl Codec for Version {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_u64(buf, self.block_num);
        encode_u64(buf, self.tx_num);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (block_num, n1) = decode_u64(buf)?;
        let (tx_num, n2) = decode_u64(&buf[n1..])?;
        Ok((Version::new(block_num, tx_num), n1 + n2))
    }
}

impl Codec for UserId {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_str(buf, &self.0);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (s, n) = decode_str(buf)?;
        Ok((UserId(s), n))
    }
}

impl Codec for DbName {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_str(buf, &self.0);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (s, n) = decode_str(buf)?;
        Ok((DbName(s), n))
    }
}

impl Codec for Key {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_bytes(buf, &self.0);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (b, n) = decode_bytes(buf)?;
        Ok((Key(b), n))
    }
}

fn encode_user_id_set(buf: &mut Vec<u8>, set: &BTreeSet<UserId>) {
    crate::primitives::encode_count(buf, set.len());
    for id in set {
        id.encode_to(buf);
    }
}

fn decode_user_id_set(buf: &[u8]) -> CodecResult<(BTreeSet<UserId>, usize)> {
    let (count, mut offset) = crate::primitives::decode_count(buf)?;
    let mut set = BTreeSet::new();
    for _ in 0..count {
        let (id, n) = UserId::decode_from(&buf[offset..])?;
        set.insert(id);
        offset += n;
    }
    Ok((set, offset))
}

impl Codec for Acl {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_user_id_set(buf, &self.read_users);
        encode_user_id_set(buf, &self.read_write_users);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (read_users, n1) = decode_user_id_set(buf)?;
        let (read_write_users, n2) = decode_user_id_set(&buf[n1..])?;
        Ok((
            Acl {
                read_users,
                read_write_users,
            },
            n1 + n2,
        ))
    }
}

impl Codec for Option<Acl> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        match self {
            None => encode_tag(buf, 0),
            Some(acl) => {
                encode_tag(buf, 1);
                acl.encode_to(buf);
            }
        }
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tag, n0) = decode_tag(buf)?;
        match tag {
            0 => Ok((None, n0)),
            1 => {
                let (acl, n1) = Acl::decode_from(&buf[n0..])?;
                Ok((Some(acl), n0 + n1))
            }
            other => Err(CodecError::Malformed(format!(
                "unknown Option<Acl> tag {other}"
            ))),
        }
    }
}

impl Codec for Metadata {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.version.encode_to(buf);
        self.access_control.encode_to(buf);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (version, n1) = Version::decode_from(buf)?;
        let (access_control, n2) = <Option<Acl>>::decode_from(&buf[n1..])?;
        Ok((
            Metadata {
                version,
                access_control,
            },
            n1 + n2,
        ))
    }
}

impl Codec for Flag {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        let tag = match self {
            Flag::Valid => 0,
            Flag::InvalidMvccConflictWithinBlock => 1,
            Flag::InvalidNoPermission => 2,
            Flag::InvalidIncorrectEntries => 3,
            Flag::Other => 255,
        };
        encode_tag(buf, tag);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tag, n) = decode_tag(buf)?;
        let flag = match tag {
            0 => Flag::Valid,
            1 => Flag::InvalidMvccConflictWithinBlock,
            2 => Flag::InvalidNoPermission,
            3 => Flag::InvalidIncorrectEntries,
            // Unknown flags decode as `Other`: unrecognized validation
            // flags are never treated as VALID.
            _ => Flag::Other,
        };
        Ok((flag, n))
    }
}

impl Codec for Vec<(Key, Version)> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        crate::primitives::encode_count(buf, self.len());
        for (k, v) in self {
            k.encode_to(buf);
            v.encode_to(buf);
        }
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (count, mut offset) = crate::primitives::decode_count(buf)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let (k, n1) = Key::decode_from(&buf[offset..])?;
            offset += n1;
            let (v, n2) = Version::decode_from(&buf[offset..])?;
            offset += n2;
            items.push((k, v));
        }
        Ok((items, offset))
    }
}

// Used by `tx.rs` for `must_sign_user_ids` / `user_deletes`.
pub(crate) fn encode_user_ids(buf: &mut Vec<u8>, ids: &[UserId]) {
    encode_vec(buf, ids);
}

pub(crate) fn decode_user_ids(buf: &[u8]) -> CodecResult<(Vec<UserId>, usize)> {
    decode_vec(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_round_trips() {
        let v = Version::new(7, 3);
        assert_eq!(Version::decode(&v.encode()).unwrap(), v);
    }

    #[test]
    fn metadata_with_acl_round_trips() {
        let mut acl = Acl::empty();
        acl.read_users.insert(UserId::from("alice"));
        acl.read_write_users.insert(UserId::from("bob"));
        let m = Metadata::with_acl(Version::new(1, 0), acl);
        assert_eq!(Metadata::decode(&m.encode()).unwrap(), m);
    }

    #[test]
    fn metadata_without_acl_round_trips() {
        let m = Metadata::new(Version::new(2, 1));
        assert_eq!(Metadata::decode(&m.encode()).unwrap(), m);
    }

    #[test]
    fn flag_unknown_tag_decodes_to_other() {
        let (flag, _) = Flag::decode_from(&[250]).unwrap();
        assert_eq!(flag, Flag::Other);
        assert!(!flag.is_valid());
    }

    #[test]
    fn db_name_and_key_round_trip() {
        let db = DbName::from("db1");
        assert_eq!(DbName::decode(&db.encode()).unwrap(), db);
        let key = Key::from_str("key1");
        assert_eq!(Key::decode(&key.encode()).unwrap(), key);
    }
}
