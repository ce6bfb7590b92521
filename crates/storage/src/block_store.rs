//! Append-only block log.

use parking_lot::RwLock;
use tracing::instrument;

use ledger_core::{Block, BlockStore, LedgerError, Result};

/// In-memory [`BlockStore`]: blocks held in a `Vec` guarded by a single
/// `RwLock`, indexed by `number - 1`.
///
/// A plain `Vec` rather than a sharded map is deliberate: blocks commit
/// one at a time, strictly in height order, under a single-writer
/// commit model, so there is never write contention across heights for
/// a sharded structure to relieve.
#[derive(Default)]
pub struct InMemoryBlockStore {
    blocks: RwLock<Vec<Block>>,
}

impl InMemoryBlockStore {
    /// Construct an empty block store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockStore for InMemoryBlockStore {
    #[instrument(skip(self, block), fields(number = block.header.number))]
    fn commit(&self, block: Block) -> Result<()> {
        let mut blocks = self.blocks.write();
        let expected = blocks.len() as u64 + 1;
        if block.header.number != expected {
            return Err(LedgerError::unexpected_block_number(
                expected,
                block.header.number,
            ));
        }
        blocks.push(block);
        Ok(())
    }

    fn get(&self, n: u64) -> Result<Option<Block>> {
        if n == 0 {
            return Ok(None);
        }
        Ok(self.blocks.read().get((n - 1) as usize).cloned())
    }

    fn height(&self) -> u64 {
        self.blocks.read().len() as u64
    }
}
