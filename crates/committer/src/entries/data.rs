//! Data-tx entry construction (spec §4.2).

use ledger_core::{
    DataTx, DbDelta, DbName, Metadata, Result, TxDataForProvenance, Version, WorldDelta,
    WorldState,
};

use super::{mark_dirty, require_previous_version, version_lookup, DirtyWriteMap};

/// Construct the world-state and provenance deltas for one valid data
/// transaction at `(block_num, tx_num)`.
///
/// `dirty` is shared across every transaction in the block: writes and
/// deletes recorded here are visible to later transactions in the same
/// block via [`version_lookup`], which is what gives blind writes within
/// a block their chained (not pre-block) backlinks (spec §4.2 "Tie-breaks
/// within a block").
pub fn construct_data_tx_entries<WS: WorldState>(
    tx: &DataTx,
    world_state: &WS,
    dirty: &mut DirtyWriteMap,
    block_num: u64,
    tx_num: u64,
) -> Result<(WorldDelta, Vec<TxDataForProvenance>)> {
    let version = Version::new(block_num, tx_num);
    let submitter = tx.submitter().cloned();

    let mut world_delta: WorldDelta = WorldDelta::new();
    let mut records = Vec::with_capacity(tx.db_operations.len());

    for op in &tx.db_operations {
        let db_delta = world_delta.entry(op.db_name.clone()).or_insert_with(DbDelta::default);

        let mut record = TxDataForProvenance {
            is_valid: true,
            db_name: op.db_name.clone(),
            user_id: submitter.clone(),
            tx_id: tx.tx_id.clone(),
            tx_index: tx_num as usize,
            reads: op.reads.clone(),
            writes: Vec::with_capacity(op.writes.len()),
            deletes: Default::default(),
            old_version_of_writes: Default::default(),
        };

        for write in &op.writes {
            let previous = version_lookup(world_state, dirty, &op.db_name, &write.key)?;
            if let Some(prev) = previous {
                record.old_version_of_writes.insert(write.key.clone(), prev);
            }
            let metadata = Metadata {
                version,
                access_control: write.acl.clone(),
            };
            db_delta.push_write(write.key.clone(), write.value.clone(), metadata.clone());
            record
                .writes
                .push((write.key.clone(), write.value.clone(), metadata));
            mark_dirty(dirty, &op.db_name, &write.key, version);
        }

        for key in &op.deletes {
            let previous = version_lookup(world_state, dirty, &op.db_name, key)?;
            let previous = require_previous_version(&op.db_name, key, previous)?;
            record.deletes.insert(key.clone(), previous);
            db_delta.push_delete(key.clone());
            mark_dirty(dirty, &op.db_name, key, version);
        }

        records.push(record);
    }

    Ok((world_delta, records))
}
