//! Pure functions turning one transaction into world-state and
//! provenance deltas (spec §4.2–§4.5).
//!
//! Every constructor here is a pure function of its inputs: the
//! transaction, the submitting user, the committing version, and a way
//! to resolve a key's current version (`VersionLookup`). None of them
//! touch a store directly — `Committer::commit` is the only place that
//! applies the resulting deltas.

pub mod config_tx;
pub mod data;
pub mod db_admin;
pub mod user_admin;

use rustc_hash::FxHashMap;

use ledger_core::{DbName, Key, Result, Version, WorldState};

/// Per-block in-memory index of the latest version each key received
/// within the block being committed (spec §4.1, §9 "Dirty-write map").
///
/// Lifetime is exactly one `commit` call: no cross-block or cross-thread
/// sharing is needed, so a plain `FxHashMap` behind no synchronization at
/// all is the right tool (matches spec §9's explicit "no ownership
/// sharing needed").
pub type DirtyWriteMap = FxHashMap<(DbName, Key), Version>;

/// Resolve the version a write/delete to `(db, key)` should record as
/// its predecessor: the dirty-write map first (an earlier write/delete
/// to the same key within this block), falling back to world state (the
/// value as of the previous block).
pub fn version_lookup<WS: WorldState>(
    world_state: &WS,
    dirty: &DirtyWriteMap,
    db: &DbName,
    key: &Key,
) -> Result<Option<Version>> {
    if let Some(v) = dirty.get(&(db.clone(), key.clone())) {
        return Ok(Some(*v));
    }
    world_state.version(db, key)
}

/// Record that `(db, key)` was just written/deleted at `version` within
/// the current block, so later transactions in the same block see this
/// as the key's predecessor rather than the pre-block value.
pub fn mark_dirty(dirty: &mut DirtyWriteMap, db: &DbName, key: &Key, version: Version) {
    dirty.insert((db.clone(), key.clone()), version);
}

/// The delete-precondition check shared by every constructor (spec §3
/// "Delete precondition" and §9's resolution of the "previous version
/// can never be nil" source comment): a valid delete's previous version
/// must be non-null, or the block is rejected as a store contract
/// violation rather than silently accepted.
pub fn require_previous_version(
    db: &DbName,
    key: &Key,
    previous: Option<Version>,
) -> Result<Version> {
    previous.ok_or_else(|| ledger_core::LedgerError::StoreContractViolated {
        detail: format!("delete of {db}/{key:?} named no previous version"),
    })
}
