//! Codec implementations for `Payload`, `BlockHeader` and `Block`.

use ledger_core::{Block, BlockHeader, ConfigTx, DataTx, DbAdministrationTx, Payload, UserAdministrationTx};

use crate::codec_trait::{decode_vec, encode_vec, Codec};
use crate::primitives::{decode_tag, encode_tag};
use crate::{CodecError, CodecResult};

impl Codec for Payload {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        match self {
            Payload::Data(txs) => {
                encode_tag(buf, 0);
                encode_vec(buf, txs);
            }
            Payload::UserAdministration(tx) => {
                encode_tag(buf, 1);
                tx.encode_to(buf);
            }
            Payload::DbAdministration(tx) => {
                encode_tag(buf, 2);
                tx.encode_to(buf);
            }
            Payload::Config(tx) => {
                encode_tag(buf, 3);
                tx.encode_to(buf);
            }
        }
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (tag, n0) = decode_tag(buf)?;
        match tag {
            0 => {
                let (txs, n1) = decode_vec::<DataTx>(&buf[n0..])?;
                Ok((Payload::Data(txs), n0 + n1))
            }
            1 => {
                let (tx, n1) = UserAdministrationTx::decode_from(&buf[n0..])?;
                Ok((Payload::UserAdministration(tx), n0 + n1))
            }
            2 => {
                let (tx, n1) = DbAdministrationTx::decode_from(&buf[n0..])?;
                Ok((Payload::DbAdministration(tx), n0 + n1))
            }
            3 => {
                let (tx, n1) = ConfigTx::decode_from(&buf[n0..])?;
                Ok((Payload::Config(tx), n0 + n1))
            }
            other => Err(CodecError::Malformed(format!("unknown Payload tag {other}"))),
        }
    }
}

impl Codec for BlockHeader {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        crate::primitives::encode_u64(buf, self.number);
        encode_vec(buf, &self.validation_info);
        buf.extend_from_slice(&self.state_root);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (number, n1) = crate::primitives::decode_u64(buf)?;
        let (validation_info, n2) = decode_vec::<ledger_core::Flag>(&buf[n1..])?;
        let off = n1 + n2;
        if buf.len() < off + 32 {
            return Err(CodecError::Truncated {
                needed: off + 32,
                available: buf.len(),
            });
        }
        let mut state_root = [0u8; 32];
        state_root.copy_from_slice(&buf[off..off + 32]);
        Ok((
            BlockHeader {
                number,
                validation_info,
                state_root,
            },
            off + 32,
        ))
    }
}

impl Codec for Block {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.header.encode_to(buf);
        self.payload.encode_to(buf);
    }

    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)> {
        let (header, n1) = BlockHeader::decode_from(buf)?;
        let (payload, n2) = Payload::decode_from(&buf[n1..])?;
        Ok((Block { header, payload }, n1 + n2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{DataTx, Flag};

    #[test]
    fn empty_data_block_round_trips() {
        let block = Block::new(1, vec![], Payload::Data(vec![]));
        assert_eq!(Block::decode(&block.encode()).unwrap(), block);
    }

    #[test]
    fn data_block_with_txs_and_flags_round_trips() {
        let mut block = Block::new(
            2,
            vec![Flag::Valid, Flag::InvalidMvccConflictWithinBlock],
            Payload::Data(vec![
                DataTx {
                    tx_id: "tx0".into(),
                    must_sign_user_ids: vec!["alice".into()],
                    db_operations: vec![],
                },
                DataTx {
                    tx_id: "tx1".into(),
                    must_sign_user_ids: vec!["bob".into()],
                    db_operations: vec![],
                },
            ]),
        );
        block.header.state_root = [7u8; 32];
        assert_eq!(Block::decode(&block.encode()).unwrap(), block);
    }
}
