//! Store abstractions the committer is written against.
//!
//! Keeping these as traits (rather than concrete types baked into the
//! committer) is what makes multi-replica determinism testable in
//! isolation: tests can swap in fresh, independent store instances per
//! replica and assert they converge.

use crate::error::Result;
use crate::model::{Block, TxDataForProvenance, WorldDelta};
use crate::types::{DbName, Key, Metadata, Version};

/// Append-only log of blocks, keyed by monotonic height.
pub trait BlockStore: Send + Sync {
    /// Append `block` iff `block.header.number == height() + 1`.
    ///
    /// # Errors
    /// Returns `LedgerError::StoreContractViolated` on height mismatch.
    fn commit(&self, block: Block) -> Result<()>;

    /// Fetch block `n`. Returns a byte-identical copy of what was
    /// committed (including the stamped `state_root`).
    fn get(&self, n: u64) -> Result<Option<Block>>;

    /// Largest committed block number, `0` if empty.
    fn height(&self) -> u64;
}

/// Current-value key-value store: `(db_name, key) -> (value, metadata)`
/// with per-key version.
pub trait WorldState: Send + Sync {
    /// Apply `delta`'s writes (add or overwrite) and deletes atomically,
    /// and stamp the store's committed height to `h`.
    ///
    /// # Errors
    /// Returns `LedgerError::StoreContractViolated` if `h` does not equal
    /// `committed_height() + 1`.
    fn commit(&self, delta: WorldDelta, h: u64) -> Result<()>;

    /// Fetch the current value and metadata for `(db, key)`.
    fn get(&self, db: &DbName, key: &Key) -> Result<Option<(Vec<u8>, Metadata)>>;

    /// Fetch only the version of `(db, key)`, if present.
    fn version(&self, db: &DbName, key: &Key) -> Result<Option<Version>> {
        Ok(self.get(db, key)?.map(|(_, m)| m.version))
    }

    /// `true` if `db` has at least one entry (including reserved system
    /// databases once they have been written to).
    fn exists(&self, db: &DbName) -> Result<bool>;

    /// Height of the last `commit` call, `0` if none yet.
    fn committed_height(&self) -> u64;
}

/// Historical provenance index over writes/reads/deletes.
pub trait ProvenanceStore: Send + Sync {
    /// Ingest the per-tx records for block `h`.
    ///
    /// # Errors
    /// Returns `LedgerError::StoreContractViolated` on duplicate tx-id
    /// index entries or mismatched height.
    fn commit(&self, h: u64, records: Vec<TxDataForProvenance>) -> Result<()>;

    /// All versions ever written to `(db, key)`, ordered by version.
    fn get_values(&self, db: &DbName, key: &Key) -> Result<Vec<(Vec<u8>, Metadata)>>;

    /// Up to `limit` versions strictly before `before`, newest first.
    fn get_previous_values(
        &self,
        db: &DbName,
        key: &Key,
        before: Version,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Metadata)>>;

    /// Up to `limit` versions strictly after `after`, oldest first.
    fn get_next_values(
        &self,
        db: &DbName,
        key: &Key,
        after: Version,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Metadata)>>;

    /// The value/metadata present at the moment of each valid delete of
    /// `(db, key)`.
    fn get_deleted_values(&self, db: &DbName, key: &Key) -> Result<Vec<(Vec<u8>, Metadata)>>;

    /// Every `(db, key, value, metadata)` ever read by `user`.
    fn get_values_read_by_user(
        &self,
        user: &crate::types::UserId,
    ) -> Result<Vec<(DbName, Key, Vec<u8>, Metadata)>>;

    /// Every tx id submitted by `user` (as `must_sign_user_ids[0]` or the
    /// sole submitting user for single-tx payload kinds).
    fn get_tx_ids_submitted_by_user(&self, user: &crate::types::UserId) -> Result<Vec<String>>;

    /// Locate a transaction by id, valid or not.
    ///
    /// # Errors
    /// Returns `LedgerError::TxIdNotFound` if `tx_id` was never indexed.
    fn get_tx_id_location(&self, tx_id: &str) -> Result<(u64, usize)>;
}

/// Merkle-Patricia trie over `(db_name ∥ key) -> value`.
pub trait StateTrie: Send + Sync {
    /// Insert or replace the value at `key`.
    ///
    /// # Errors
    /// Returns `LedgerError::Corruption` on structural failure.
    fn update(&mut self, key: &[u8], value: Vec<u8>) -> Result<()>;

    /// Remove `key`, if present.
    ///
    /// # Errors
    /// Returns `LedgerError::Corruption` on structural failure.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Hash of the current in-memory trie state.
    ///
    /// # Errors
    /// Returns `LedgerError::Corruption` on structural failure.
    fn hash(&self) -> Result<[u8; 32]>;

    /// Persist all new/changed nodes under height `h`.
    ///
    /// # Errors
    /// Returns `LedgerError::Corruption` on persistence failure.
    fn commit(&mut self, h: u64) -> Result<()>;

    /// Height of the last `commit` call, `0` if none yet.
    fn height(&self) -> u64;
}
