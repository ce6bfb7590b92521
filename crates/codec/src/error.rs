//! Codec error type.

use thiserror::Error;

/// Result type used by this crate's encode/decode functions.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Failure modes for the binary wire codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Not enough bytes remained to decode the next field.
    #[error("truncated input: needed {needed} bytes, had {available}")]
    Truncated {
        /// Bytes required to decode the next field.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// Bytes decoded but did not form a valid value (bad UTF-8, unknown
    /// enum tag, malformed JSON index schema).
    #[error("malformed encoding: {0}")]
    Malformed(String),
}

impl From<CodecError> for ledger_core::LedgerError {
    fn from(e: CodecError) -> Self {
        ledger_core::LedgerError::Codec(e.to_string())
    }
}
