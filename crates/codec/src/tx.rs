//! Codec implementations for data and user-administration transactions.

use ledger_core::{DataTx, DataWrite, DbOperation, UserAdministrationTx, UserWrite};

use crate::basic::{decode_user_ids, encode_user_ids};
use crate::codec_trait::{decode_vec, encode_vec, Codec};
use crate::primitives::{decode_str, encode_str};
use crate::CodecResult;

impl Codec for DataWrite {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.key.encode_to(buf);
        crate::primitives::encode_bytes(buf, &self.value);
        self.acl.encode_to(buf);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (key, n1) = ledger_core::Key::decode_from(buf)?;
        let (value, n2) = crate::primitives::decode_bytes(&buf[n1..])?;
        let (acl, n3) = <Option<ledger_core::Acl>>::decode_from(&buf[n1 + n2..])?;
        Ok((DataWrite { key, value, acl }, n1 + n2 + n3))
    }
}

impl Codec for DbOperation {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.db_name.encode_to(buf);
        self.reads.encode_to(buf);
        encode_vec(buf, &self.writes);
        encode_vec(buf, &self.deletes);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (db_name, n1) = ledger_core::DbName::decode_from(buf)?;
        let (reads, n2) = <Vec<(ledger_core::Key, ledger_core::Version)>>::decode_from(&buf[n1..])?;
        let off = n1 + n2;
        let (writes, n3) = decode_vec::<DataWrite>(&buf[off..])?;
        let off = off + n3;
        let (deletes, n4) = decode_vec::<ledger_core::Key>(&buf[off..])?;
        Ok((
            DbOperation {
                db_name,
                reads,
                writes,
                deletes,
            },
            off + n4,
        ))
    }
}

impl Codec for DataTx {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_str(buf, &self.tx_id);
        encode_user_ids(buf, &self.must_sign_user_ids);
        encode_vec(buf, &self.db_operations);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tx_id, n1) = decode_str(buf)?;
        let (must_sign_user_ids, n2) = decode_user_ids(&buf[n1..])?;
        let (db_operations, n3) = decode_vec::<DbOperation>(&buf[n1 + n2..])?;
        Ok((
            DataTx {
                tx_id,
                must_sign_user_ids,
                db_operations,
            },
            n1 + n2 + n3,
        ))
    }
}

impl Codec for UserWrite {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.user.encode_to(buf);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (user, n) = ledger_core::User::decode_from(buf)?;
        Ok((UserWrite { user }, n))
    }
}

impl Codec for UserAdministrationTx {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_str(buf, &self.tx_id);
        self.user_id.encode_to(buf);
        encode_vec(buf, &self.user_writes);
        encode_user_ids(buf, &self.user_deletes);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tx_id, n1) = decode_str(buf)?;
        let (user_id, n2) = ledger_core::UserId::decode_from(&buf[n1..])?;
        let off = n1 + n2;
        let (user_writes, n3) = decode_vec::<UserWrite>(&buf[off..])?;
        let off = off + n3;
        let (user_deletes, n4) = decode_user_ids(&buf[off..])?;
        Ok((
            UserAdministrationTx {
                tx_id,
                user_id,
                user_writes,
                user_deletes,
            },
            off + n4,
        ))
    }
}
