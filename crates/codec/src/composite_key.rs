//! The trie's composite key: a prefix-free encoding of `(db_name, key)`.
//!
//! `composite_key(db_name, key) = encode_length(db_name) ∥ db_name_bytes ∥
//! encode_length(key) ∥ key_bytes`. The 4-byte big-endian length prefix
//! is deterministic and makes the encoding prefix-free: no valid
//! composite key is a prefix of another, since the first four bytes
//! always announce exactly how many database-name bytes follow.

use ledger_core::{DbName, Key};

use crate::primitives::encode_bytes;

/// Build the trie key for `(db_name, key)`.
pub fn composite_key(db_name: &DbName, key: &Key) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + db_name.as_bytes().len() + key.as_bytes().len());
    encode_bytes(&mut buf, db_name.as_bytes());
    encode_bytes(&mut buf, key.as_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_db_key_pairs_yield_distinct_composite_keys() {
        let a = composite_key(&DbName::from("db1"), &Key::from_str("key1"));
        let b = composite_key(&DbName::from("db1"), &Key::from_str("key2"));
        let c = composite_key(&DbName::from("db2"), &Key::from_str("key1"));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn no_composite_key_is_a_prefix_of_another() {
        // "db" + "1key" vs "db1" + "key" would collide under naive
        // concatenation; the length prefix must keep them apart.
        let a = composite_key(&DbName::from("db"), &Key::from_str("1key"));
        let b = composite_key(&DbName::from("db1"), &Key::from_str("key"));
        assert_ne!(a, b);
        assert!(!b.starts_with(&a) && !a.starts_with(&b));
    }
}
