//! Db-administration entry construction (spec §4.4).

use ledger_core::{
    DbAdministrationTx, DbDelta, DbName, DbOp, Key, Metadata, Result, TxDataForProvenance, Version,
    WorldDelta, WorldState,
};

use super::{mark_dirty, require_previous_version, version_lookup, DirtyWriteMap};

/// Construct the `_dbs` world-state and provenance deltas for one valid
/// db-administration transaction.
///
/// Processes `create_dbs`, then the remaining (re-indexing) entries of
/// `dbs_index`, then `delete_dbs`, matching the order spec §4.4 lists
/// them in. A local dirty-write map is still threaded through even
/// though this payload kind carries exactly one transaction, since
/// `version_lookup` needs *some* map to consult; nothing but this call
/// ever populates it.
pub fn construct_db_admin_entries<WS: WorldState>(
    tx: &DbAdministrationTx,
    world_state: &WS,
    block_num: u64,
) -> Result<(WorldDelta, Vec<TxDataForProvenance>)> {
    let version = Version::new(block_num, 0);
    let db_name = DbName::from(DbName::DBS);
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

    let mut dbs_index = tx.dbs_index.clone();

    for name in &tx.create_dbs {
        let schema = dbs_index.remove(name).flatten();
        let value = ledger_codec::encode_index_schema(schema.as_ref());
        let key = Key::from(name.0.as_bytes().to_vec());
        push_write(
            world_state,
            &mut dirty,
            &db_name,
            &key,
            value,
            version,
            db_delta,
            &mut record,
        )?;
    }

    for (name, schema) in &dbs_index {
        let value = ledger_codec::encode_index_schema(schema.as_ref());
        let key = Key::from(name.0.as_bytes().to_vec());
        push_write(
            world_state,
            &mut dirty,
            &db_name,
            &key,
            value,
            version,
            db_delta,
            &mut record,
        )?;
    }

    for name in &tx.delete_dbs {
        let key = Key::from(name.0.as_bytes().to_vec());
        let previous = version_lookup(world_state, &dirty, &db_name, &key)?;
        let previous = require_previous_version(&db_name, &key, previous)?;
        record.deletes.insert(key.clone(), previous);
        db_delta.push_delete(key.clone());
        mark_dirty(&mut dirty, &db_name, &key, version);
    }

    Ok((world_delta, vec![record]))
}

#[allow(clippy::too_many_arguments)]
fn push_write<WS: WorldState>(
    world_state: &WS,
    dirty: &mut DirtyWriteMap,
    db_name: &DbName,
    key: &Key,
    value: Vec<u8>,
    version: Version,
    db_delta: &mut DbDelta,
    record: &mut TxDataForProvenance,
) -> Result<()> {
    let previous = version_lookup(world_state, dirty, db_name, key)?;
    if let Some(prev) = previous {
        record.old_version_of_writes.insert(key.clone(), prev);
    }
    let metadata = Metadata::new(version);
    db_delta.push_write(key.clone(), value.clone(), metadata.clone());
    record.writes.push((key.clone(), value, metadata));
    mark_dirty(dirty, db_name, key, version);
    Ok(())
}
