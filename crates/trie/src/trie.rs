//! The Merkle-Patricia trie itself: insert, delete and commit.

use ledger_core::{LedgerError, Result, StateTrie};

use crate::backend::TrieBackend;
use crate::nibbles::{bytes_to_nibbles, common_prefix_len};
use crate::node::Node;

/// A Merkle-Patricia trie over nibble-encoded keys, backed by `B`.
///
/// Grounded in the recursive-update shape common to Patricia trie
/// implementations: `update`/`delete` walk the tree rebuilding the path
/// from the root, rather than mutating nodes in place, which keeps every
/// prior `commit`'s root reachable through `B` until the backend
/// chooses to prune it.
pub struct MerklePatriciaTrie<B: TrieBackend> {
    root: Node,
    backend: B,
    height: u64,
}

impl<B: TrieBackend> MerklePatriciaTrie<B> {
    /// Build a trie over `backend`, resuming from its highest persisted
    /// root if one exists.
    pub fn new(backend: B) -> Self {
        let height = backend.height();
        let root = backend.load(height).unwrap_or(Node::Empty);
        Self {
            root,
            backend,
            height,
        }
    }

    fn insert(node: Node, path: &[u8], value: Vec<u8>) -> Node {
        match node {
            Node::Empty => Node::Leaf {
                path: path.to_vec(),
                value,
            },
            Node::Leaf {
                path: leaf_path,
                value: leaf_value,
            } => {
                if leaf_path == path {
                    return Node::Leaf {
                        path: path.to_vec(),
                        value,
                    };
                }
                Self::split_and_insert(leaf_path, Some(leaf_value), path, value)
            }
            Node::Extension {
                path: ext_path,
                child,
            } => {
                let shared = common_prefix_len(&ext_path, path);
                if shared == ext_path.len() {
                    let new_child = Self::insert(*child, &path[shared..], value);
                    Node::Extension {
                        path: ext_path,
                        child: Box::new(new_child),
                    }
                } else {
                    Self::split_extension(ext_path, *child, shared, path, value)
                }
            }
            Node::Branch { mut children, value: branch_value } => {
                if path.is_empty() {
                    Node::Branch {
                        children,
                        value: Some(value),
                    }
                } else {
                    let idx = path[0] as usize;
                    let new_child = Self::insert(
                        std::mem::replace(&mut children[idx], Node::Empty),
                        &path[1..],
                        value,
                    );
                    children[idx] = new_child;
                    Node::Branch {
                        children,
                        value: branch_value,
                    }
                }
            }
        }
    }

    /// Split a leaf (or the leaf-equivalent end of an extension) whose
    /// path diverges from the incoming `path` at the shared prefix.
    fn split_and_insert(
        existing_path: Vec<u8>,
        existing_value: Option<Vec<u8>>,
        new_path: &[u8],
        new_value: Vec<u8>,
    ) -> Node {
        let shared = common_prefix_len(&existing_path, new_path);
        let mut branch_children = Node::empty_branch();
        let mut branch_value = None;

        let existing_rest = &existing_path[shared..];
        if existing_rest.is_empty() {
            branch_value = existing_value;
        } else if let Node::Branch { children, .. } = &mut branch_children {
            children[existing_rest[0] as usize] = Node::Leaf {
                path: existing_rest[1..].to_vec(),
                value: existing_value.unwrap_or_default(),
            };
        }

        let new_rest = &new_path[shared..];
        if new_rest.is_empty() {
            branch_value = Some(new_value);
        } else if let Node::Branch { children, .. } = &mut branch_children {
            children[new_rest[0] as usize] = Node::Leaf {
                path: new_rest[1..].to_vec(),
                value: new_value,
            };
        }

        if let Node::Branch { children, .. } = branch_children {
            let branch = Node::Branch {
                children,
                value: branch_value,
            };
            wrap_with_prefix(&existing_path[..shared], branch)
        } else {
            unreachable!("branch_children is always constructed as Node::Branch")
        }
    }

    fn split_extension(
        ext_path: Vec<u8>,
        child: Node,
        shared: usize,
        new_path: &[u8],
        new_value: Vec<u8>,
    ) -> Node {
        let mut branch_children = Node::empty_branch();
        let mut branch_value = None;

        let ext_rest = &ext_path[shared..];
        if let Node::Branch { children, .. } = &mut branch_children {
            if ext_rest.len() == 1 {
                children[ext_rest[0] as usize] = child;
            } else {
                children[ext_rest[0] as usize] = Node::Extension {
                    path: ext_rest[1..].to_vec(),
                    child: Box::new(child),
                };
            }
        }

        let new_rest = &new_path[shared..];
        if new_rest.is_empty() {
            branch_value = Some(new_value);
        } else if let Node::Branch { children, .. } = &mut branch_children {
            children[new_rest[0] as usize] = Node::Leaf {
                path: new_rest[1..].to_vec(),
                value: new_value,
            };
        }

        if let Node::Branch { children, .. } = branch_children {
            let branch = Node::Branch {
                children,
                value: branch_value,
            };
            wrap_with_prefix(&ext_path[..shared], branch)
        } else {
            unreachable!("branch_children is always constructed as Node::Branch")
        }
    }

    fn remove(node: Node, path: &[u8]) -> Node {
        match node {
            Node::Empty => Node::Empty,
            Node::Leaf {
                path: leaf_path,
                value,
            } => {
                if leaf_path == path {
                    Node::Empty
                } else {
                    Node::Leaf {
                        path: leaf_path,
                        value,
                    }
                }
            }
            Node::Extension {
                path: ext_path,
                child,
            } => {
                let shared = common_prefix_len(&ext_path, path);
                if shared != ext_path.len() {
                    return Node::Extension {
                        path: ext_path,
                        child,
                    };
                }
                let new_child = Self::remove(*child, &path[shared..]);
                collapse_extension(ext_path, new_child)
            }
            Node::Branch {
                mut children,
                value,
            } => {
                let remaining_value = if path.is_empty() {
                    None
                } else {
                    let idx = path[0] as usize;
                    let new_child = Self::remove(
                        std::mem::replace(&mut children[idx], Node::Empty),
                        &path[1..],
                    );
                    children[idx] = new_child;
                    value
                };
                collapse_branch(children, remaining_value)
            }
        }
    }
}

/// Wrap `branch` with an [`Node::Extension`] over `prefix`, or return it
/// unwrapped if `prefix` is empty.
fn wrap_with_prefix(prefix: &[u8], branch: Node) -> Node {
    if prefix.is_empty() {
        branch
    } else {
        Node::Extension {
            path: prefix.to_vec(),
            child: Box::new(branch),
        }
    }
}

/// After removing from an extension's child, collapse a now-empty or
/// now-leaf/extension child into this node, keeping the trie canonical.
fn collapse_extension(ext_path: Vec<u8>, child: Node) -> Node {
    match child {
        Node::Empty => Node::Empty,
        Node::Leaf {
            path: child_path,
            value,
        } => {
            let mut path = ext_path;
            path.extend_from_slice(&child_path);
            Node::Leaf { path, value }
        }
        Node::Extension {
            path: child_path,
            child: grandchild,
        } => {
            let mut path = ext_path;
            path.extend_from_slice(&child_path);
            Node::Extension {
                path,
                child: grandchild,
            }
        }
        branch @ Node::Branch { .. } => Node::Extension {
            path: ext_path,
            child: Box::new(branch),
        },
    }
}

/// After removing a value/child from a branch, collapse it if it now has
/// zero or one live children, keeping the trie canonical.
fn collapse_branch(children: Box<[Node; 16]>, value: Option<Vec<u8>>) -> Node {
    let live: Vec<(usize, &Node)> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
        .collect();

    match (live.len(), &value) {
        (0, None) => Node::Empty,
        (0, Some(v)) => Node::Leaf {
            path: vec![],
            value: v.clone(),
        },
        (1, None) => {
            let (idx, _) = live[0];
            let child = children.into_iter().nth(idx).expect("idx in range");
            match child {
                Node::Leaf { path, value } => {
                    let mut full_path = vec![idx as u8];
                    full_path.extend_from_slice(&path);
                    Node::Leaf {
                        path: full_path,
                        value,
                    }
                }
                Node::Extension { path, child } => {
                    let mut full_path = vec![idx as u8];
                    full_path.extend_from_slice(&path);
                    Node::Extension {
                        path: full_path,
                        child,
                    }
                }
                branch @ Node::Branch { .. } => Node::Extension {
                    path: vec![idx as u8],
                    child: Box::new(branch),
                },
                Node::Empty => unreachable!("filtered out above"),
            }
        }
        _ => Node::Branch {
            children,
            value,
        },
    }
}

impl<B: TrieBackend> StateTrie for MerklePatriciaTrie<B> {
    fn update(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        let path = bytes_to_nibbles(key);
        let root = std::mem::replace(&mut self.root, Node::Empty);
        self.root = Self::insert(root, &path, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        let path = bytes_to_nibbles(key);
        let root = std::mem::replace(&mut self.root, Node::Empty);
        self.root = Self::remove(root, &path);
        Ok(())
    }

    fn hash(&self) -> Result<[u8; 32]> {
        Ok(self.root.hash())
    }

    fn commit(&mut self, h: u64) -> Result<()> {
        if h != self.height + 1 {
            return Err(LedgerError::StoreContractViolated {
                detail: format!(
                    "trie commit height mismatch: expected [{}] but received [{h}]",
                    self.height + 1
                ),
            });
        }
        self.backend.persist(h, self.root.clone());
        self.height = h;
        Ok(())
    }

    fn height(&self) -> u64 {
        self.height
    }
}
