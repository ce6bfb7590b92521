//! Block commit pipeline orchestrator for the permissioned ledger.
//!
//! [`Committer`] is the single entry point: given a validated [`Block`],
//! it constructs world-state and provenance deltas, applies them to the
//! state trie, stamps the resulting root, and persists block, provenance,
//! world state and trie in that order.
//!
//! [`entries`] holds the pure, store-independent functions that turn one
//! transaction into a delta pair; `Committer::commit` is the only place
//! that actually applies them to a store.

#![warn(missing_docs)]

pub mod committer;
pub mod config;
pub mod entries;

pub use committer::Committer;
pub use config::CommitterConfig;
pub use ledger_core::Block;
