//! Block and transaction payload types.
//!
//! Concrete Rust shapes for the commit pipeline's records: `Block`, the
//! four payload-envelope variants, the user/node/cluster config records,
//! and the world/provenance delta types the committer produces while
//! applying a block.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Acl, DbName, Flag, IndexSchema, Key, Metadata, UserId, Version};

/// A single write within a data-tx database operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataWrite {
    /// Key being written.
    pub key: Key,
    /// New value.
    pub value: Vec<u8>,
    /// Access control list to stamp, if any.
    pub acl: Option<Acl>,
}

/// Operations against a single database within one data transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbOperation {
    /// Database these operations apply to.
    pub db_name: DbName,
    /// Reads taken from the transaction, copied verbatim into provenance.
    pub reads: Vec<(Key, Version)>,
    /// Writes to apply.
    pub writes: Vec<DataWrite>,
    /// Keys to delete.
    pub deletes: Vec<Key>,
}

/// A single data transaction within a `DataTxEnvelopes` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTx {
    /// Transaction identifier.
    pub tx_id: String,
    /// Users who signed this transaction; the first is the submitter of
    /// record for provenance.
    pub must_sign_user_ids: Vec<UserId>,
    /// Per-database operations.
    pub db_operations: Vec<DbOperation>,
}

impl DataTx {
    /// The submitter of record: `must_sign_user_ids[0]`.
    pub fn submitter(&self) -> Option<&UserId> {
        self.must_sign_user_ids.first()
    }
}

/// A user record stored in `_users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier, also the `_users` key.
    pub id: UserId,
    /// Certificate bytes.
    pub certificate: Vec<u8>,
    /// Administrative privilege level.
    pub privilege: Privilege,
}

/// Privilege level of a `User` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Privilege {
    /// Ordinary user.
    User,
    /// Cluster administrator.
    Admin,
}

/// A single user write in a `UserAdministrationTxEnvelope`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWrite {
    /// The user record to write.
    pub user: User,
}

/// A single user-administration transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAdministrationTx {
    /// Transaction identifier.
    pub tx_id: String,
    /// Submitting user.
    pub user_id: UserId,
    /// Users to write (add or update).
    pub user_writes: Vec<UserWrite>,
    /// User ids to delete.
    pub user_deletes: Vec<UserId>,
}

/// A single database-administration transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbAdministrationTx {
    /// Transaction identifier.
    pub tx_id: String,
    /// Submitting user.
    pub user_id: UserId,
    /// Database names to create.
    pub create_dbs: Vec<DbName>,
    /// Database names to delete.
    pub delete_dbs: Vec<DbName>,
    /// Index schema updates: `None` clears the schema, `Some(schema)` sets
    /// it. Entries consumed by `create_dbs` are applied there; the rest
    /// re-index existing databases.
    pub dbs_index: BTreeMap<DbName, Option<IndexSchema>>,
}

/// Per-node record stored in `_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node identifier, also the `_config` key.
    pub id: String,
    /// Network address of the node.
    pub address: String,
    /// Node certificate bytes.
    pub certificate: Vec<u8>,
}

/// Opaque CA configuration blob. CA management itself is out of scope;
/// only round-trip of this field is required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CertAuthConfig(pub Vec<u8>);

/// The cluster configuration record, serialized whole into `_config/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster nodes.
    pub nodes: Vec<NodeConfig>,
    /// Cluster admins.
    pub admins: Vec<User>,
    /// CA configuration.
    pub cert_auth_config: CertAuthConfig,
}

/// A single config-rotation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTx {
    /// Transaction identifier.
    pub tx_id: String,
    /// Submitting user.
    pub user_id: UserId,
    /// The new cluster configuration.
    pub new_config: ClusterConfig,
    /// The version of the config this tx read, if any (unset on the first
    /// config block).
    pub read_old_config_version: Option<Version>,
}

/// The payload of a block: exactly one of four variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Ordered list of data transactions.
    Data(Vec<DataTx>),
    /// A single user-administration transaction.
    UserAdministration(UserAdministrationTx),
    /// A single database-administration transaction.
    DbAdministration(DbAdministrationTx),
    /// A single config-rotation transaction.
    Config(ConfigTx),
}

impl Payload {
    /// Number of transactions carried by this payload (1 for the three
    /// single-tx kinds, the list length for `Data`).
    pub fn tx_count(&self) -> usize {
        match self {
            Payload::Data(txs) => txs.len(),
            Payload::UserAdministration(_) | Payload::DbAdministration(_) | Payload::Config(_) => {
                1
            }
        }
    }
}

/// Block header: number, per-tx validation verdicts, and the state root
/// stamped by the committer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Monotonic block height, starting at 1.
    pub number: u64,
    /// Per-transaction validation verdicts, in transaction order.
    pub validation_info: Vec<Flag>,
    /// State trie root after applying this block's valid transactions.
    pub state_root: [u8; 32],
}

/// A block: header plus payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,
    /// Block payload.
    pub payload: Payload,
}

impl Block {
    /// Construct a block with a zeroed state root; the committer stamps
    /// the real root during `commit`.
    pub fn new(number: u64, validation_info: Vec<Flag>, payload: Payload) -> Self {
        Self {
            header: BlockHeader {
                number,
                validation_info,
                state_root: [0u8; 32],
            },
            payload,
        }
    }
}

/// One operation within a [`DbDelta`], in the order it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbOp {
    /// Write `key` to `value`, stamped with `metadata`.
    Write(Key, Vec<u8>, Metadata),
    /// Delete `key`.
    Delete(Key),
}

/// Per-database write/delete delta produced by the entry constructors, as
/// a chronologically ordered sequence of operations.
///
/// Order matters across transactions within a block: a key deleted by
/// one transaction and rewritten by a later one in the same block must
/// end up written, not absent, so the world state and trie apply `ops`
/// in this order rather than all writes followed by all deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbDelta {
    /// Operations to apply, oldest first.
    pub ops: Vec<DbOp>,
}

impl DbDelta {
    /// Append a write.
    pub fn push_write(&mut self, key: Key, value: Vec<u8>, metadata: Metadata) {
        self.ops.push(DbOp::Write(key, value, metadata));
    }

    /// Append a delete.
    pub fn push_delete(&mut self, key: Key) {
        self.ops.push(DbOp::Delete(key));
    }
}

/// World-state delta for an entire block: one `DbDelta` per touched
/// database.
pub type WorldDelta = BTreeMap<DbName, DbDelta>;

/// Per-transaction provenance record (the per-transaction provenance record).
///
/// One `TxDataForProvenance` covers exactly one database; transactions
/// that touch more than one database (db-admin across `_dbs`, config
/// across `_users` and `_config`) produce multiple records, one per
/// database, all sharing `tx_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDataForProvenance {
    /// Whether the source transaction was valid.
    pub is_valid: bool,
    /// Database this record covers.
    pub db_name: DbName,
    /// Submitting user, when known (absent for invalid-only placeholder
    /// records where the payload carried no user, which does not occur
    /// in this data model but is kept `Option` for forward compatibility).
    pub user_id: Option<UserId>,
    /// Transaction identifier.
    pub tx_id: String,
    /// Position of the source transaction within the block's transaction
    /// list (not this record's position in the flattened per-database
    /// record list a multi-database transaction produces).
    pub tx_index: usize,
    /// Reads taken verbatim from the transaction.
    pub reads: Vec<(Key, Version)>,
    /// Writes: key, value, stamped metadata.
    pub writes: Vec<(Key, Vec<u8>, Metadata)>,
    /// Deletes: key -> previous version.
    pub deletes: BTreeMap<Key, Version>,
    /// Previous version of each overwritten key (backlink for the
    /// provenance store's previous/next chain).
    pub old_version_of_writes: BTreeMap<Key, Version>,
}

impl TxDataForProvenance {
    /// An invalid-tx placeholder record: no reads/writes/deletes, just
    /// enough to populate the tx-id location index.
    pub fn invalid(db_name: DbName, tx_id: String, tx_index: usize) -> Self {
        Self {
            is_valid: false,
            db_name,
            user_id: None,
            tx_id,
            tx_index,
            reads: Vec::new(),
            writes: Vec::new(),
            deletes: BTreeMap::new(),
            old_version_of_writes: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_tx_count_matches_kind() {
        assert_eq!(Payload::Data(vec![]).tx_count(), 0);
        assert_eq!(
            Payload::Data(vec![DataTx {
                tx_id: "t0".into(),
                must_sign_user_ids: vec![],
                db_operations: vec![],
            }])
            .tx_count(),
            1
        );
    }

    #[test]
    fn data_tx_submitter_is_first_signer() {
        let tx = DataTx {
            tx_id: "t0".into(),
            must_sign_user_ids: vec![UserId::from("alice"), UserId::from("bob")],
            db_operations: vec![],
        };
        assert_eq!(tx.submitter(), Some(&UserId::from("alice")));
    }

    #[test]
    fn block_new_zeroes_state_root() {
        let block = Block::new(1, vec![Flag::Valid], Payload::Data(vec![]));
        assert_eq!(block.header.state_root, [0u8; 32]);
        assert_eq!(block.header.number, 1);
    }
}
