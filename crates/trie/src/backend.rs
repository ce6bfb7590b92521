//! Node storage, separated from trie logical structure.
//!
//! Mirrors `examples/cheme-substrate`'s split of `TrieBackendEssence`
//! (the trie graph) from `TrieBackend` (where nodes actually live): here
//! [`crate::node::Node`] is the graph, [`TrieBackend`] is the storage
//! side a caller can swap for a persistent implementation without
//! touching trie logic.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::node::Node;

/// Storage for committed trie roots, keyed by block height.
pub trait TrieBackend: Send + Sync {
    /// Persist `root` as the trie state as of height `h`.
    fn persist(&self, h: u64, root: Node);

    /// Fetch the root committed at height `h`, if any.
    fn load(&self, h: u64) -> Option<Node>;

    /// Highest height ever persisted, `0` if none.
    fn height(&self) -> u64;
}

/// In-memory [`TrieBackend`] keyed by height.
///
/// Uses `RwLock` guarding a `BTreeMap` rather than a sharded map: trie
/// roots are committed one height at a time under a single-writer
/// commit model, so there is no concurrent-write contention a sharded
/// map would help with.
#[derive(Default)]
pub struct InMemoryTrieBackend {
    roots: RwLock<BTreeMap<u64, Node>>,
}

impl InMemoryTrieBackend {
    /// Construct an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrieBackend for InMemoryTrieBackend {
    fn persist(&self, h: u64, root: Node) {
        self.roots.write().insert(h, root);
    }

    fn load(&self, h: u64) -> Option<Node> {
        self.roots.read().get(&h).cloned()
    }

    fn height(&self) -> u64 {
        self.roots.read().keys().next_back().copied().unwrap_or(0)
    }
}
