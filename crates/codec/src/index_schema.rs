//! JSON encoding of database index schemas.
//!
//! The `_dbs` value for an indexed database is a JSON object mapping
//! attribute names to a type tag drawn from `{BOOLEAN, NUMBER, STRING}`.
//! An empty, null, or missing schema encodes as empty bytes. Encoding
//! order is not required to be stable — downstream consumers parse as a
//! map — so this deliberately does not go through the length-prefixed
//! binary codec used elsewhere in this crate.

use ledger_core::IndexSchema;

/// Encode `schema` as canonical JSON, or empty bytes if `None`/empty.
pub fn encode_index_schema(schema: Option<&IndexSchema>) -> Vec<u8> {
    match schema {
        None => Vec::new(),
        Some(s) if s.is_empty() => Vec::new(),
        Some(s) => serde_json::to_vec(s).expect("IndexSchema serializes infallibly"),
    }
}

/// Decode bytes previously produced by [`encode_index_schema`].
///
/// Empty input decodes to `None`.
pub fn decode_index_schema(bytes: &[u8]) -> Result<Option<IndexSchema>, serde_json::Error> {
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(bytes)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::IndexAttributeType;

    #[test]
    fn empty_schema_encodes_to_empty_bytes() {
        assert!(encode_index_schema(None).is_empty());
        assert!(encode_index_schema(Some(&IndexSchema::new())).is_empty());
    }

    #[test]
    fn schema_round_trips_through_json() {
        let mut schema = IndexSchema::new();
        schema.insert("attr1".to_string(), IndexAttributeType::Boolean);
        schema.insert("attr2".to_string(), IndexAttributeType::Number);
        let encoded = encode_index_schema(Some(&schema));
        let decoded = decode_index_schema(&encoded).unwrap();
        assert_eq!(decoded, Some(schema));
    }

    #[test]
    fn empty_bytes_decode_to_none() {
        assert_eq!(decode_index_schema(&[]).unwrap(), None);
    }
}
