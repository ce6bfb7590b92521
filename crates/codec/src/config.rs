//! Codec implementations for user/node/cluster configuration records and
//! the db-administration and config transactions.

use std::collections::BTreeMap;

use ledger_core::{
    CertAuthConfig, ClusterConfig, ConfigTx, DbAdministrationTx, DbName, IndexSchema, NodeConfig,
    Privilege, User, Version,
};

use crate::codec_trait::{decode_vec, encode_vec, Codec};
use crate::index_schema::{decode_index_schema, encode_index_schema};
use crate::primitives::{decode_bytes, decode_str, decode_tag, encode_bytes, encode_str, encode_tag};
use crate::{CodecError, CodecResult};

impl Codec for Privilege {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_tag(
            buf,
            match self {
                Privilege::User => 0,
                Privilege::Admin => 1,
            },
        );
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tag, n) = decode_tag(buf)?;
        let p = match tag {
            0 => Privilege::User,
            1 => Privilege::Admin,
            other => return Err(CodecError::Malformed(format!("unknown Privilege tag {other}"))),
        };
        Ok((p, n))
    }
}

impl Codec for User {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.id.encode_to(buf);
        encode_bytes(buf, &self.certificate);
        self.privilege.encode_to(buf);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (id, n1) = ledger_core::UserId::decode_from(buf)?;
        let (certificate, n2) = decode_bytes(&buf[n1..])?;
        let (privilege, n3) = Privilege::decode_from(&buf[n1 + n2..])?;
        Ok((
            User {
                id,
                certificate,
                privilege,
            },
            n1 + n2 + n3,
        ))
    }
}

impl Codec for NodeConfig {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_str(buf, &self.id);
        encode_str(buf, &self.address);
        encode_bytes(buf, &self.certificate);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (id, n1) = decode_str(buf)?;
        let (address, n2) = decode_str(&buf[n1..])?;
        let (certificate, n3) = decode_bytes(&buf[n1 + n2..])?;
        Ok((
            NodeConfig {
                id,
                address,
                certificate,
            },
            n1 + n2 + n3,
        ))
    }
}

impl Codec for CertAuthConfig {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_bytes(buf, &self.0);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (b, n) = decode_bytes(buf)?;
        Ok((CertAuthConfig(b), n))
    }
}

impl Codec for ClusterConfig {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_vec(buf, &self.nodes);
        encode_vec(buf, &self.admins);
        self.cert_auth_config.encode_to(buf);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (nodes, n1) = decode_vec::<NodeConfig>(buf)?;
        let (admins, n2) = decode_vec::<User>(&buf[n1..])?;
        let (cert_auth_config, n3) = CertAuthConfig::decode_from(&buf[n1 + n2..])?;
        Ok((
            ClusterConfig {
                nodes,
                admins,
                cert_auth_config,
            },
            n1 + n2 + n3,
        ))
    }
}

impl Codec for Option<Version> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        match self {
            None => encode_tag(buf, 0),
            Some(v) => {
                encode_tag(buf, 1);
                v.encode_to(buf);
            }
        }
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tag, n0) = decode_tag(buf)?;
        match tag {
            0 => Ok((None, n0)),
            1 => {
                let (v, n1) = Version::decode_from(&buf[n0..])?;
                Ok((Some(v), n0 + n1))
            }
            other => Err(CodecError::Malformed(format!(
                "unknown Option<Version> tag {other}"
            ))),
        }
    }
}

impl Codec for ConfigTx {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_str(buf, &self.tx_id);
        self.user_id.encode_to(buf);
        self.new_config.encode_to(buf);
        self.read_old_config_version.encode_to(buf);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tx_id, n1) = decode_str(buf)?;
        let (user_id, n2) = ledger_core::UserId::decode_from(&buf[n1..])?;
        let off = n1 + n2;
        let (new_config, n3) = ClusterConfig::decode_from(&buf[off..])?;
        let off = off + n3;
        let (read_old_config_version, n4) = <Option<Version>>::decode_from(&buf[off..])?;
        Ok((
            ConfigTx {
                tx_id,
                user_id,
                new_config,
                read_old_config_version,
            },
            off + n4,
        ))
    }
}

/// Encode `dbs_index` as a count followed by `(db_name, schema_bytes)`
/// pairs, where `schema_bytes` is the JSON encoding from
/// [`crate::index_schema`] (empty for `None`/empty schemas).
fn encode_dbs_index(buf: &mut Vec<u8>, index: &BTreeMap<DbName, Option<IndexSchema>>) {
    crate::primitives::encode_count(buf, index.len());
    for (name, schema) in index {
        name.encode_to(buf);
        encode_bytes(buf, &encode_index_schema(schema.as_ref()));
    }
}

fn decode_dbs_index(buf: &[u8]) -> CodecResult<(BTreeMap<DbName, Option<IndexSchema>>, usize)> {
    let (count, mut offset) = crate::primitives::decode_count(buf)?;
    let mut index = BTreeMap::new();
    for _ in 0..count {
        let (name, n1) = DbName::decode_from(&buf[offset..])?;
        offset += n1;
        let (schema_bytes, n2) = decode_bytes(&buf[offset..])?;
        offset += n2;
        let schema = decode_index_schema(&schema_bytes)
            .map_err(|e| CodecError::Malformed(format!("index schema: {e}")))?;
        index.insert(name, schema);
    }
    Ok((index, offset))
}

impl Codec for DbAdministrationTx {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_str(buf, &self.tx_id);
        self.user_id.encode_to(buf);
        encode_vec(buf, &self.create_dbs);
        encode_vec(buf, &self.delete_dbs);
        encode_dbs_index(buf, &self.dbs_index);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tx_id, n1) = decode_str(buf)?;
        let (user_id, n2) = ledger_core::UserId::decode_from(&buf[n1..])?;
        let off = n1 + n2;
        let (create_dbs, n3) = decode_vec::<DbName>(&buf[off..])?;
        let off = off + n3;
        let (delete_dbs, n4) = decode_vec::<DbName>(&buf[off..])?;
        let off = off + n4;
        let (dbs_index, n5) = decode_dbs_index(&buf[off..])?;
        Ok((
            DbAdministrationTx {
                tx_id,
                user_id,
                create_dbs,
                delete_dbs,
                dbs_index,
            },
            off + n5,
        ))
    }
}
