//! # permissioned-ledger
//!
//! The block commit pipeline of a permissioned key-value ledger: given a
//! validated [`Block`], deterministically mutates a block store, a
//! current-value world state, a historical provenance index, and a
//! Merkle-Patricia state trie so that every replica that commits the same
//! block sequence converges on identical stores and state roots.
//!
//! ```no_run
//! use permissioned_ledger::{
//!     Block, Committer, CommitterConfig, Flag, InMemoryBlockStore,
//!     InMemoryProvenanceStore, InMemoryTrieBackend, InMemoryWorldState,
//!     MerklePatriciaTrie, Payload,
//! };
//!
//! let mut committer = Committer::new(
//!     InMemoryBlockStore::new(),
//!     InMemoryWorldState::new(),
//!     InMemoryProvenanceStore::new(),
//!     MerklePatriciaTrie::new(InMemoryTrieBackend::new()),
//!     CommitterConfig::default(),
//! );
//!
//! let block = Block::new(1, vec![Flag::Valid], Payload::Data(vec![]));
//! committer.commit(block)?;
//! # Ok::<(), permissioned_ledger::LedgerError>(())
//! ```
//!
//! This crate is a thin facade: the real work lives in `ledger-core`
//! (types and store traits), `ledger-codec` (wire encoding), `ledger-trie`
//! (the state trie), `ledger-storage` (block store and world state),
//! `ledger-provenance` (the provenance index), and `ledger-committer`
//! (the orchestrator). Application code should depend on this crate;
//! internal crates are implementation detail.

pub use ledger_committer::{Block, Committer, CommitterConfig};
pub use ledger_core::{
    Acl, BlockHeader, BlockStore, CertAuthConfig, ClusterConfig, ConfigTx, DataTx, DataWrite,
    DbAdministrationTx, DbDelta, DbName, DbOp, DbOperation, Flag, IndexAttributeType, IndexSchema,
    Key, LedgerError, Metadata, NodeConfig, Payload, Privilege, ProvenanceStore, Result, StateTrie,
    TxDataForProvenance, User, UserAdministrationTx, UserId, UserWrite, Version, WorldDelta,
    WorldState,
};
pub use ledger_provenance::InMemoryProvenanceStore;
pub use ledger_storage::{InMemoryBlockStore, InMemoryWorldState};
pub use ledger_trie::{InMemoryTrieBackend, MerklePatriciaTrie, TrieBackend};
