//! Schema-driven binary wire encoding for ledger block and tx payloads.
//!
//! Explicit length-prefixed encode/decode functions per record type,
//! rather than an opaque `serde`-derived format: byte-for-byte round-trip
//! stability across releases is a property hand-rolled framing
//! guarantees by construction and a derive macro does not (a struct
//! field reorder during a refactor silently changes the derived output).
//!
//! - [`codec_trait::Codec`]: the trait every wire type implements.
//! - [`composite_key`]: the trie's `(db_name, key) -> bytes` encoding.
//! - [`index_schema`]: JSON encoding for `_dbs` index schemas.

pub mod basic;
pub mod block;
pub mod codec_trait;
pub mod composite_key;
pub mod config;
pub mod error;
pub mod index_schema;
pub mod primitives;
pub mod tx;

pub use codec_trait::Codec;
pub use composite_key::composite_key;
pub use error::{CodecError, CodecResult};
pub use index_schema::{decode_index_schema, encode_index_schema};
