//! User-administration entry construction (spec §4.3).

use ledger_core::{
    DbDelta, DbName, DbOp, Key, Metadata, Result, TxDataForProvenance, UserAdministrationTx,
    Version, WorldDelta, WorldState,
};

use super::{mark_dirty, require_previous_version, version_lookup, DirtyWriteMap};

/// Construct the `_users` world-state and provenance deltas for one
/// valid user-administration transaction.
///
/// A single tx touches `_users` only, so no cross-tx dirty-write map is
/// needed (spec §4.3: "no in-block dirty map needed — single tx"); an
/// empty one is still threaded through `version_lookup` so writes and
/// deletes to the same user id within this one tx still chain correctly.
pub fn construct_user_admin_entries<WS: WorldState>(
    tx: &UserAdministrationTx,
    world_state: &WS,
    block_num: u64,
) -> Result<(WorldDelta, Vec<TxDataForProvenance>)> {
    let version = Version::new(block_num, 0);
    let db_name = DbName::from(DbName::USERS);
    let mut dirty = DirtyWriteMap::default();

    let mut world_delta: WorldDelta = WorldDelta::new();
    let db_delta = world_delta.entry(db_name.clone()).or_insert_with(DbDelta::default);

    let mut record = TxDataForProvenance {
        is_valid: true,
        db_name: db_name.clone(),
        user_id: Some(tx.user_id.clone()),
        tx_id: tx.tx_id.clone(),
        tx_index: 0,
        reads: Vec::new(),
        writes: Vec::new(),
        deletes: Default::default(),
        old_version_of_writes: Default::default(),
    };

    for write in &tx.user_writes {
        let key = Key::from(write.user.id.0.as_bytes().to_vec());
        let previous = version_lookup(world_state, &dirty, &db_name, &key)?;
        if let Some(prev) = previous {
            record.old_version_of_writes.insert(key.clone(), prev);
        }
        let value = ledger_codec::Codec::encode(&write.user);
        let metadata = Metadata::new(version);
        db_delta.push_write(key.clone(), value.clone(), metadata.clone());
        record.writes.push((key.clone(), value, metadata));
        mark_dirty(&mut dirty, &db_name, &key, version);
    }

    for user_id in &tx.user_deletes {
        let key = Key::from(user_id.0.as_bytes().to_vec());
        let previous = version_lookup(world_state, &dirty, &db_name, &key)?;
        let previous = require_previous_version(&db_name, &key, previous)?;
        record.deletes.insert(key.clone(), previous);
        db_delta.push_delete(key.clone());
        mark_dirty(&mut dirty, &db_name, &key, version);
    }

    Ok((world_delta, vec![record]))
}
