//! Core domain types shared by every store and by the committer.
//!
//! - `Version`: the `(block_num, tx_num)` pair stamped on every write.
//! - `DbName`/`Key`/`UserId`: newtypes over `String`/`Vec<u8>` so that
//!   composite-key construction can't accidentally mix up arbitrary byte
//!   buffers with domain identifiers.
//! - `Metadata`/`Acl`: the value stamped alongside every world-state entry.
//! - `Flag`: validation verdicts assigned upstream, consumed here.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lexicographically ordered `(block_num, tx_num)` pair stamped on every write.
///
/// Total order is derived field-by-field: `block_num` dominates, `tx_num`
/// breaks ties within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Height of the block that produced this version.
    pub block_num: u64,
    /// Index of the transaction within that block.
    pub tx_num: u64,
}

impl Version {
    /// Construct a version from its two components.
    pub const fn new(block_num: u64, tx_num: u64) -> Self {
        Self { block_num, tx_num }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.block_num, self.tx_num)
    }
}

/// Name of a database (a reserved system database or a user database).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DbName(pub String);

impl DbName {
    /// The registry of user databases and their index schemas.
    pub const DBS: &'static str = "_dbs";
    /// The registry of user records.
    pub const USERS: &'static str = "_users";
    /// Cluster config plus per-node records.
    pub const CONFIG: &'static str = "_config";

    /// Reserved key under `_config` at which the serialized `ClusterConfig` lives.
    pub const CONFIG_KEY: &'static str = "config";

    /// Borrow the underlying UTF-8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// `true` for `_dbs`, `_users`, `_config`.
    pub fn is_system(&self) -> bool {
        matches!(self.0.as_str(), Self::DBS | Self::USERS | Self::CONFIG)
    }
}

impl From<&str> for DbName {
    fn from(s: &str) -> Self {
        DbName(s.to_string())
    }
}

impl From<String> for DbName {
    fn from(s: String) -> Self {
        DbName(s)
    }
}

impl fmt::Display for DbName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A key within a database: arbitrary bytes, but kept distinct from a raw
/// `Vec<u8>` so that trie composite-key construction can't be handed the
/// wrong buffer by accident.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(pub Vec<u8>);

impl Key {
    /// Construct a key from a UTF-8 string, the common case in tests.
    pub fn from_str(s: &str) -> Self {
        Key(s.as_bytes().to_vec())
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::from_str(s)
    }
}

impl From<Vec<u8>> for Key {
    fn from(v: Vec<u8>) -> Self {
        Key(v)
    }
}

/// Identifier of a user or admin (also the node-id for `_config` entries).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access control list carried in `Metadata`.
///
/// Set membership, not insertion order, determines equality and therefore
/// deterministic serialization (see `ledger-codec`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Acl {
    /// Users permitted to read the value.
    pub read_users: BTreeSet<UserId>,
    /// Users permitted to read and write the value.
    pub read_write_users: BTreeSet<UserId>,
}

impl Acl {
    /// An ACL with no restrictions recorded (world-readable/writable by
    /// whatever the surrounding validator already allowed).
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Metadata stamped on every world-state entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The version of the transaction that produced this value.
    pub version: Version,
    /// Optional access control list.
    pub access_control: Option<Acl>,
}

impl Metadata {
    /// Stamp metadata for a committing version with no ACL.
    pub fn new(version: Version) -> Self {
        Self {
            version,
            access_control: None,
        }
    }

    /// Stamp metadata for a committing version with an ACL.
    pub fn with_acl(version: Version, acl: Acl) -> Self {
        Self {
            version,
            access_control: Some(acl),
        }
    }
}

/// Validation verdict assigned upstream and consumed by the committer.
///
/// Callers should prefer `is_valid()` over an exhaustive match: unknown
/// or unrecognized flags are never treated as VALID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    /// The transaction is valid and must mutate state.
    Valid,
    /// Rejected: a read in this tx conflicts with a write earlier in the
    /// same block.
    InvalidMvccConflictWithinBlock,
    /// Rejected: the submitter lacked permission.
    InvalidNoPermission,
    /// Rejected: the transaction's entries were malformed.
    InvalidIncorrectEntries,
    /// Any other rejection reason recognized by the validator but not
    /// specially handled by the committer.
    Other,
}

impl Flag {
    /// Only `Valid` transactions mutate state.
    pub fn is_valid(&self) -> bool {
        matches!(self, Flag::Valid)
    }
}

/// Attribute type recorded in a database index schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexAttributeType {
    /// Boolean-valued attribute.
    Boolean,
    /// Numeric-valued attribute.
    Number,
    /// String-valued attribute.
    String,
}

/// Index schema: attribute name -> type. `None` / empty encodes as empty
/// bytes in the `_dbs` world-state value.
pub type IndexSchema = std::collections::BTreeMap<String, IndexAttributeType>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_orders_lexicographically() {
        assert!(Version::new(1, 5) < Version::new(2, 0));
        assert!(Version::new(2, 0) < Version::new(2, 1));
        assert_eq!(Version::new(2, 1), Version::new(2, 1));
    }

    #[test]
    fn db_name_recognizes_system_databases() {
        assert!(DbName::from(DbName::DBS).is_system());
        assert!(DbName::from(DbName::USERS).is_system());
        assert!(DbName::from(DbName::CONFIG).is_system());
        assert!(!DbName::from("db1").is_system());
    }

    #[test]
    fn flag_is_valid_only_for_valid_variant() {
        assert!(Flag::Valid.is_valid());
        assert!(!Flag::InvalidMvccConflictWithinBlock.is_valid());
        assert!(!Flag::InvalidNoPermission.is_valid());
        assert!(!Flag::InvalidIncorrectEntries.is_valid());
        assert!(!Flag::Other.is_valid());
    }
}
