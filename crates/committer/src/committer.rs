//! The block commit pipeline orchestrator (spec §4.1).

use tracing::{debug, info_span, warn};

use ledger_codec::composite_key;
use ledger_core::{
    Block, BlockStore, DbName, DbOp, Flag, LedgerError, Payload, ProvenanceStore, Result,
    StateTrie, TxDataForProvenance, WorldDelta, WorldState,
};

use crate::config::CommitterConfig;
use crate::entries::{
    config_tx::construct_config_tx_entries, data::construct_data_tx_entries,
    db_admin::construct_db_admin_entries, user_admin::construct_user_admin_entries,
    DirtyWriteMap,
};

/// Orchestrates the seven-step commit algorithm over its four injected
/// collaborators.
///
/// Collaborators are bound as generic parameters rather than `dyn Trait`
/// objects: a process runs exactly one implementation of each store for
/// its lifetime, so static dispatch avoids a vtable indirection on the
/// hot commit path (matches `UnifiedStore: Storage` in the teacher's
/// storage crate).
pub struct Committer<BS, WS, PS, T>
where
    BS: BlockStore,
    WS: WorldState,
    PS: ProvenanceStore,
    T: StateTrie,
{
    block_store: BS,
    world_state: WS,
    provenance_store: PS,
    trie: T,
    #[allow(dead_code)]
    config: CommitterConfig,
}

impl<BS, WS, PS, T> Committer<BS, WS, PS, T>
where
    BS: BlockStore,
    WS: WorldState,
    PS: ProvenanceStore,
    T: StateTrie,
{
    /// Build a committer from its four collaborators with no startup
    /// consistency check. Prefer [`Committer::open`] when the stores may
    /// already hold data from a previous process.
    pub fn new(block_store: BS, world_state: WS, provenance_store: PS, trie: T, config: CommitterConfig) -> Self {
        Self {
            block_store,
            world_state,
            provenance_store,
            trie,
            config,
        }
    }

    /// Build a committer, failing fast if the trie lags the block store.
    ///
    /// The trie and block store must already agree at process start;
    /// rebuilding a trie from scratch is a recovery-tool concern, not the
    /// committer's (spec §4.9 "loading at startup reconstructs the trie").
    pub fn open(
        block_store: BS,
        world_state: WS,
        provenance_store: PS,
        trie: T,
        config: CommitterConfig,
    ) -> Result<Self> {
        if trie.height() < block_store.height() {
            return Err(LedgerError::StoreContractViolated {
                detail: format!(
                    "trie height {} lags block store height {} at startup",
                    trie.height(),
                    block_store.height()
                ),
            });
        }
        Ok(Self::new(block_store, world_state, provenance_store, trie, config))
    }

    /// Borrow the world state, for read-path collaborators built on top
    /// of this committer.
    pub fn world_state(&self) -> &WS {
        &self.world_state
    }

    /// Borrow the provenance store, for read-path collaborators built on
    /// top of this committer.
    pub fn provenance_store(&self) -> &PS {
        &self.provenance_store
    }

    /// Borrow the block store.
    pub fn block_store(&self) -> &BS {
        &self.block_store
    }

    /// Current trie root, without mutating anything.
    pub fn trie_hash(&self) -> Result<[u8; 32]> {
        self.trie.hash()
    }

    /// Run the seven-step commit algorithm over `block`, stamping its
    /// `state_root` in place.
    pub fn commit(&mut self, mut block: Block) -> Result<()> {
        let height = block.header.number;
        let span = info_span!("commit", block = height);
        let _guard = span.enter();

        // Step 1: construct deltas.
        let (world_delta, prov_delta) = self.construct_deltas(&block)?;
        debug!(dbs = world_delta.len(), txs = prov_delta.len(), "entries constructed");

        // Steps 2-3: apply world delta to the trie, then hash it.
        self.apply_delta_to_trie(&world_delta)?;
        let root = self.trie.hash().map_err(|e| {
            warn!(error = %e, "trie hash failed");
            e
        })?;
        block.header.state_root = root;
        debug!(root = %hex_prefix(&root), "state root computed");

        // Step 4: persist block. Block store leads: it is the replicated
        // source of truth any other store can be rebuilt from.
        self.block_store.commit(block)?;

        // Step 5: persist provenance.
        self.provenance_store.commit(height, prov_delta)?;

        // Step 6: persist world state.
        self.world_state.commit(world_delta, height)?;

        // Step 7: checkpoint the trie.
        self.trie.commit(height)?;

        debug!("commit complete");
        Ok(())
    }

    /// Dispatch on payload kind to build the block's world-state and
    /// provenance deltas (spec §4.1 step 1).
    fn construct_deltas(&self, block: &Block) -> Result<(WorldDelta, Vec<TxDataForProvenance>)> {
        let block_num = block.header.number;
        match &block.payload {
            Payload::Data(txs) => self.construct_data_deltas(txs, &block.header.validation_info, block_num),
            Payload::UserAdministration(tx) => {
                if is_valid_single_tx(&block.header.validation_info) {
                    construct_user_admin_entries(tx, &self.world_state, block_num)
                } else {
                    Ok(invalid_single_tx_record(DbName::from(DbName::USERS), &tx.tx_id))
                }
            }
            Payload::DbAdministration(tx) => {
                if is_valid_single_tx(&block.header.validation_info) {
                    construct_db_admin_entries(tx, &self.world_state, block_num)
                } else {
                    // spec §9: the source drops this provenance record
                    // entirely; SPEC_FULL resolves the open question by
                    // emitting it, for consistency with the other three
                    // payload kinds.
                    Ok(invalid_single_tx_record(DbName::from(DbName::DBS), &tx.tx_id))
                }
            }
            Payload::Config(tx) => {
                if is_valid_single_tx(&block.header.validation_info) {
                    construct_config_tx_entries(tx, &self.world_state, block_num)
                } else {
                    Ok(invalid_single_tx_record(DbName::from(DbName::CONFIG), &tx.tx_id))
                }
            }
        }
    }

    /// Construct deltas for a `DataTxEnvelopes` block: iterate txs in
    /// order, skipping state mutation for non-`VALID` txs but still
    /// recording their tx-id location, sharing one dirty-write map across
    /// the whole block (spec §4.1 step 1, §4.2).
    fn construct_data_deltas(
        &self,
        txs: &[ledger_core::DataTx],
        validation_info: &[Flag],
        block_num: u64,
    ) -> Result<(WorldDelta, Vec<TxDataForProvenance>)> {
        let mut world_delta = WorldDelta::new();
        let mut records = Vec::with_capacity(txs.len());
        let mut dirty = DirtyWriteMap::default();

        for (tx_num, tx) in txs.iter().enumerate() {
            let valid = validation_info.get(tx_num).map(Flag::is_valid).unwrap_or(false);
            if !valid {
                let db_name = tx
                    .db_operations
                    .first()
                    .map(|op| op.db_name.clone())
                    .unwrap_or_else(|| DbName::from(""));
                records.push(TxDataForProvenance::invalid(db_name, tx.tx_id.clone(), tx_num));
                continue;
            }
            let (delta, tx_records) =
                construct_data_tx_entries(tx, &self.world_state, &mut dirty, block_num, tx_num as u64)?;
            merge_world_delta(&mut world_delta, delta);
            records.extend(tx_records);
        }
        Ok((world_delta, records))
    }

    /// Apply every operation in `delta` to the trie via its composite
    /// key, in chronological order (spec §4.1 step 2; order matters when
    /// a key is deleted then rewritten within the same block).
    fn apply_delta_to_trie(&mut self, delta: &WorldDelta) -> Result<()> {
        for (db_name, db_delta) in delta {
            for op in &db_delta.ops {
                match op {
                    DbOp::Write(key, value, _metadata) => {
                        let trie_key = composite_key(db_name, key);
                        self.trie.update(&trie_key, value.clone())?;
                    }
                    DbOp::Delete(key) => {
                        let trie_key = composite_key(db_name, key);
                        self.trie.delete(&trie_key)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn is_valid_single_tx(validation_info: &[Flag]) -> bool {
    validation_info.first().map(Flag::is_valid).unwrap_or(false)
}

fn invalid_single_tx_record(db_name: DbName, tx_id: &str) -> (WorldDelta, Vec<TxDataForProvenance>) {
    (
        WorldDelta::new(),
        vec![TxDataForProvenance::invalid(db_name, tx_id.to_string(), 0)],
    )
}

/// Fold one transaction's delta into the block-wide accumulator,
/// preserving transaction order: `from`'s ops are appended after
/// whatever `into` already holds for the same database, since `from`
/// always belongs to a transaction later in the block than anything
/// already merged.
fn merge_world_delta(into: &mut WorldDelta, from: WorldDelta) {
    for (db, delta) in from {
        into.entry(db).or_default().ops.extend(delta.ops);
    }
}

fn hex_prefix(bytes: &[u8; 32]) -> String {
    bytes[..4].iter().map(|b| format!("{b:02x}")).collect()
}
