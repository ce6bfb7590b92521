//! Error types for the ledger commit pipeline.
//!
//! `LedgerError` is the unified error currency between stores and the
//! committer, organized around a small taxonomy:
//!
//! - **Constructor errors** — bad payload content (e.g. malformed index
//!   schema JSON). Non-fatal to the process but the block does not commit.
//! - **Store contract violations** — unexpected block height, mismatched
//!   commit height, duplicate tx-id index entry. Fatal: the caller must
//!   halt block intake.
//! - **Corruption indicators** — trie update/delete/hash failures. Fatal.
//! - **Not-found errors** — provenance queries for unknown tx ids.

use thiserror::Error;

/// Result type alias used throughout the ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unified error type for the ledger commit pipeline.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A payload could not be turned into world-state/provenance deltas.
    #[error("failed to construct entries for tx {tx_id:?}: {detail}")]
    ConstructEntriesFailed {
        /// The offending transaction id, when known.
        tx_id: Option<String>,
        /// Human-readable detail.
        detail: String,
    },

    /// A store rejected an operation that violates its contract (wrong
    /// block number, mismatched commit height, duplicate index entry).
    /// Fatal: commits must not continue past this error.
    #[error("store contract violated: {detail}")]
    StoreContractViolated {
        /// Human-readable detail identifying the store and violation.
        detail: String,
    },

    /// The trie reported a structural failure while updating, deleting or
    /// hashing. Indicates divergence; fatal.
    #[error("state corruption: {detail}")]
    Corruption {
        /// Human-readable detail.
        detail: String,
    },

    /// A provenance query referenced an unknown transaction id.
    #[error("tx_id_not_found: {0}")]
    TxIdNotFound(String),

    /// Binary/JSON codec failure.
    #[error("codec error: {0}")]
    Codec(String),
}

impl LedgerError {
    /// Construct an `unexpected_block_number` style contract violation.
    pub fn unexpected_block_number(expected: u64, received: u64) -> Self {
        LedgerError::StoreContractViolated {
            detail: format!(
                "expected block number [{expected}] but received [{received}]"
            ),
        }
    }

    /// `true` for errors that are fatal to further commits: store contract
    /// violations and corruption indicators. Callers (the replication
    /// layer, or the demo CLI binary in this workspace) use this to decide
    /// whether to halt block intake.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LedgerError::StoreContractViolated { .. } | LedgerError::Corruption { .. }
        )
    }
}
