//! Core types and traits for the permissioned ledger commit pipeline.
//!
//! This crate defines the foundational types used throughout the system:
//! - `Version`, `Metadata`, `Acl`, `Flag`: the data model.
//! - `Block`, the four payload-envelope variants, `ClusterConfig`,
//!   `User`, `NodeConfig`: the wire-level records.
//! - `WorldDelta`, `TxDataForProvenance`: the deltas the committer
//!   produces while applying a block.
//! - `BlockStore`, `WorldState`, `ProvenanceStore`, `StateTrie`: the store
//!   abstractions the committer is written against.
//! - `LedgerError`: the unified error type.

#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod traits;
pub mod types;

pub use error::{LedgerError, Result};
pub use model::{
    Block, BlockHeader, CertAuthConfig, ClusterConfig, ConfigTx, DataTx, DataWrite,
    DbAdministrationTx, DbDelta, DbOp, DbOperation, NodeConfig, Payload, Privilege,
    TxDataForProvenance, User, UserAdministrationTx, UserWrite, WorldDelta,
};
pub use traits::{BlockStore, ProvenanceStore, StateTrie, WorldState};
pub use types::{Acl, DbName, Flag, IndexAttributeType, IndexSchema, Key, Metadata, UserId, Version};
