//! Current-value key-value store sharded by database name.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::instrument;

use ledger_core::{DbName, DbOp, Key, LedgerError, Metadata, Result, WorldDelta, WorldState};

/// In-memory [`WorldState`], sharded by `DbName` then by `Key`.
///
/// Grounded in the teacher's `DashMap`-per-partition idiom: here the
/// outer `DashMap` shards by database (the natural partition for this
/// system, since the reserved system databases and user databases never
/// share keys), and an inner `DashMap` holds the current value per key.
/// Lock-free reads across databases; writes only ever touch shards for
/// databases the committing block actually wrote.
#[derive(Default)]
pub struct InMemoryWorldState {
    dbs: DashMap<DbName, DashMap<Key, (Vec<u8>, Metadata)>>,
    height: AtomicU64,
}

impl InMemoryWorldState {
    /// Construct an empty world state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorldState for InMemoryWorldState {
    #[instrument(skip(self, delta), fields(height = h, dbs = delta.len()))]
    fn commit(&self, delta: WorldDelta, h: u64) -> Result<()> {
        let expected = self.height.load(Ordering::Acquire) + 1;
        if h != expected {
            return Err(LedgerError::unexpected_block_number(expected, h));
        }
        for (db_name, db_delta) in delta {
            let shard = self.dbs.entry(db_name).or_default();
            for op in db_delta.ops {
                match op {
                    DbOp::Write(key, value, metadata) => {
                        shard.insert(key, (value, metadata));
                    }
                    DbOp::Delete(key) => {
                        shard.remove(&key);
                    }
                }
            }
        }
        self.height.store(h, Ordering::Release);
        Ok(())
    }

    fn get(&self, db: &DbName, key: &Key) -> Result<Option<(Vec<u8>, Metadata)>> {
        Ok(self
            .dbs
            .get(db)
            .and_then(|shard| shard.get(key).map(|entry| entry.value().clone())))
    }

    fn exists(&self, db: &DbName) -> Result<bool> {
        Ok(self.dbs.get(db).is_some_and(|shard| !shard.is_empty()))
    }

    fn committed_height(&self) -> u64 {
        self.height.load(Ordering::Acquire)
    }
}
