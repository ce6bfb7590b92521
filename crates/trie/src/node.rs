//! Trie node representation and canonical hashing.
//!
//! Grounded in `examples/cheme-substrate`'s separation of trie logical
//! structure (`TrieBackendEssence`'s node graph) from node storage
//! (`TrieBackend`): [`Node`] is the pure in-memory structure, storage is
//! [`crate::backend::TrieBackend`]'s concern. Node hashing uses `sha2`
//! (already a teacher dependency via `strata-engine`) over a small
//! canonical encoding rather than reusing [`ledger_codec`]'s tagged
//! formats, since node hashes must stay stable independent of any wire
//! format changes to the block/tx payload types.

use sha2::{Digest, Sha256};

/// A node in the Merkle-Patricia trie, keyed by nibble paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// No entries below this point.
    Empty,
    /// A leaf holding the remaining nibble path and the value.
    Leaf {
        /// Nibbles remaining between this node and the value.
        path: Vec<u8>,
        /// The stored value bytes.
        value: Vec<u8>,
    },
    /// A shared nibble path with a single child (branch or leaf).
    Extension {
        /// Nibbles shared by every key below this node.
        path: Vec<u8>,
        /// The single child below the shared path.
        child: Box<Node>,
    },
    /// A 16-way fan-out keyed by the next nibble, with an optional value
    /// for a key that terminates exactly at this node.
    Branch {
        /// One child per nibble value `0..16`.
        children: Box<[Node; 16]>,
        /// Value for a key whose path ends at this branch.
        value: Option<Vec<u8>>,
    },
}

/// The hash of [`Node::Empty`], used as the trie's root hash when it
/// holds no entries.
pub fn empty_hash() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"ledger-trie:empty");
    hasher.finalize().into()
}

fn branch_new() -> [Node; 16] {
    std::array::from_fn(|_| Node::Empty)
}

impl Node {
    /// Fresh, empty branch node.
    pub fn empty_branch() -> Node {
        Node::Branch {
            children: Box::new(branch_new()),
            value: None,
        }
    }

    /// `true` for [`Node::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Canonical hash of this node and everything below it.
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        match self {
            Node::Empty => return empty_hash(),
            Node::Leaf { path, value } => {
                hasher.update([0u8]);
                hash_path(&mut hasher, path);
                hash_bytes(&mut hasher, value);
            }
            Node::Extension { path, child } => {
                hasher.update([1u8]);
                hash_path(&mut hasher, path);
                hasher.update(child.hash());
            }
            Node::Branch { children, value } => {
                hasher.update([2u8]);
                for child in children.iter() {
                    hasher.update(child.hash());
                }
                match value {
                    None => hasher.update([0u8]),
                    Some(v) => {
                        hasher.update([1u8]);
                        hash_bytes(&mut hasher, v);
                    }
                }
            }
        }
        hasher.finalize().into()
    }
}

fn hash_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

fn hash_path(hasher: &mut Sha256, path: &[u8]) {
    hasher.update((path.len() as u64).to_be_bytes());
    hasher.update(path);
}
