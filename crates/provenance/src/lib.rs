//! Historical provenance index over ledger writes, reads and deletes.
//!
//! Grounded in the teacher's secondary-index idiom — a value store kept
//! in lock-step with side indices built purely from what commits — but
//! reshaped for append-only history rather than a mutable KV store:
//! every index here (`tx_locations`, `tx_ids_by_user`, `reads_by_user`,
//! per-key `deleted`) is populated during the same `commit` call that
//! appends to `histories`, and nothing is ever removed from them.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::instrument;

use ledger_core::{
    DbName, Key, LedgerError, Metadata, ProvenanceStore, Result, TxDataForProvenance, UserId,
    Version,
};

#[derive(Default, Clone)]
struct KeyHistory {
    /// Every value ever written to this key, ordered by version.
    versions: Vec<(Vec<u8>, Metadata)>,
    /// The value/metadata present at the moment of each valid delete.
    deleted: Vec<(Vec<u8>, Metadata)>,
}

/// In-memory [`ProvenanceStore`].
pub struct InMemoryProvenanceStore {
    histories: DashMap<(DbName, Key), KeyHistory>,
    reads_by_user: DashMap<UserId, Vec<(DbName, Key, Vec<u8>, Metadata)>>,
    tx_ids_by_user: DashMap<UserId, Vec<String>>,
    tx_locations: DashMap<String, (u64, usize)>,
    height: AtomicU64,
}

impl Default for InMemoryProvenanceStore {
    fn default() -> Self {
        Self {
            histories: DashMap::new(),
            reads_by_user: DashMap::new(),
            tx_ids_by_user: DashMap::new(),
            tx_locations: DashMap::new(),
            height: AtomicU64::new(0),
        }
    }
}

impl InMemoryProvenanceStore {
    /// Construct an empty provenance store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProvenanceStore for InMemoryProvenanceStore {
    #[instrument(skip(self, records), fields(height = h, records = records.len()))]
    fn commit(&self, h: u64, records: Vec<TxDataForProvenance>) -> Result<()> {
        let expected = self.height.load(Ordering::Acquire) + 1;
        if h != expected {
            return Err(LedgerError::unexpected_block_number(expected, h));
        }

        // A transaction spanning multiple databases (db-admin, config)
        // emits one record per database, all sharing `tx_id` and
        // `tx_index`. Check each distinct `tx_id` against the persisted
        // index exactly once, and reject a `tx_id` whose records disagree
        // on `tx_index` within this same commit.
        let mut tx_index_this_commit: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            match tx_index_this_commit.get(record.tx_id.as_str()) {
                Some(&seen) if seen != record.tx_index => {
                    return Err(LedgerError::StoreContractViolated {
                        detail: format!(
                            "tx id {} recorded at both index {} and {} within block {}",
                            record.tx_id, seen, record.tx_index, h
                        ),
                    });
                }
                Some(_) => {}
                None => {
                    tx_index_this_commit.insert(record.tx_id.as_str(), record.tx_index);
                    if self.tx_locations.contains_key(&record.tx_id) {
                        return Err(LedgerError::StoreContractViolated {
                            detail: format!("duplicate tx id in provenance index: {}", record.tx_id),
                        });
                    }
                }
            }
        }

        let mut indexed_this_commit: HashSet<String> = HashSet::new();
        for record in records.into_iter() {
            if indexed_this_commit.insert(record.tx_id.clone()) {
                self.tx_locations.insert(record.tx_id.clone(), (h, record.tx_index));
                if let Some(user) = &record.user_id {
                    self.tx_ids_by_user
                        .entry(user.clone())
                        .or_default()
                        .push(record.tx_id.clone());
                }
            }
            if !record.is_valid {
                continue;
            }

            for (key, prev_version) in &record.deletes {
                let id = (record.db_name.clone(), key.clone());
                let mut history = self.histories.entry(id).or_default();
                let current = history.versions.last().cloned().ok_or_else(|| {
                    LedgerError::StoreContractViolated {
                        detail: format!("delete of {key:?} with no prior write history"),
                    }
                })?;
                if current.1.version != *prev_version {
                    return Err(LedgerError::StoreContractViolated {
                        detail: format!(
                            "delete of {key:?} named previous version {prev_version} but history's current version is {}",
                            current.1.version
                        ),
                    });
                }
                history.deleted.push(current);
            }

            for (key, value, metadata) in &record.writes {
                let id = (record.db_name.clone(), key.clone());
                self.histories
                    .entry(id)
                    .or_default()
                    .versions
                    .push((value.clone(), metadata.clone()));
            }

            if let Some(user) = &record.user_id {
                for (key, version) in &record.reads {
                    let id = (record.db_name.clone(), key.clone());
                    if let Some(history) = self.histories.get(&id) {
                        if let Some((value, metadata)) = history
                            .versions
                            .iter()
                            .find(|(_, metadata)| metadata.version == *version)
                        {
                            self.reads_by_user.entry(user.clone()).or_default().push((
                                record.db_name.clone(),
                                key.clone(),
                                value.clone(),
                                metadata.clone(),
                            ));
                        }
                    }
                }
            }
        }

        self.height.store(h, Ordering::Release);
        Ok(())
    }

    fn get_values(&self, db: &DbName, key: &Key) -> Result<Vec<(Vec<u8>, Metadata)>> {
        Ok(self
            .histories
            .get(&(db.clone(), key.clone()))
            .map(|h| h.versions.clone())
            .unwrap_or_default())
    }

    fn get_previous_values(
        &self,
        db: &DbName,
        key: &Key,
        before: Version,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Metadata)>> {
        let Some(history) = self.histories.get(&(db.clone(), key.clone())) else {
            return Ok(Vec::new());
        };
        let mut matches: Vec<_> = history
            .versions
            .iter()
            .filter(|(_, metadata)| metadata.version < before)
            .cloned()
            .collect();
        matches.reverse();
        if let Some(limit) = limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }

    fn get_next_values(
        &self,
        db: &DbName,
        key: &Key,
        after: Version,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Metadata)>> {
        let Some(history) = self.histories.get(&(db.clone(), key.clone())) else {
            return Ok(Vec::new());
        };
        let mut matches: Vec<_> = history
            .versions
            .iter()
            .filter(|(_, metadata)| metadata.version > after)
            .cloned()
            .collect();
        if let Some(limit) = limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }

    fn get_deleted_values(&self, db: &DbName, key: &Key) -> Result<Vec<(Vec<u8>, Metadata)>> {
        Ok(self
            .histories
            .get(&(db.clone(), key.clone()))
            .map(|h| h.deleted.clone())
            .unwrap_or_default())
    }

    fn get_values_read_by_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<(DbName, Key, Vec<u8>, Metadata)>> {
        Ok(self
            .reads_by_user
            .get(user)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    fn get_tx_ids_submitted_by_user(&self, user: &UserId) -> Result<Vec<String>> {
        Ok(self
            .tx_ids_by_user
            .get(user)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    fn get_tx_id_location(&self, tx_id: &str) -> Result<(u64, usize)> {
        self.tx_locations
            .get(tx_id)
            .map(|loc| *loc)
            .ok_or_else(|| LedgerError::TxIdNotFound(tx_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_write(
        db: &str,
        tx_id: &str,
        user: &str,
        key: &str,
        value: &[u8],
        version: Version,
    ) -> TxDataForProvenance {
        TxDataForProvenance {
            is_valid: true,
            db_name: DbName::from(db),
            user_id: Some(UserId::from(user)),
            tx_id: tx_id.to_string(),
            tx_index: 0,
            reads: Vec::new(),
            writes: vec![(Key::from_str(key), value.to_vec(), Metadata::new(version))],
            deletes: Default::default(),
            old_version_of_writes: Default::default(),
        }
    }

    #[test]
    fn commit_indexes_writes_and_tx_location() {
        let store = InMemoryProvenanceStore::new();
        let record = record_write("db1", "tx0", "alice", "key1", b"v1", Version::new(1, 0));
        store.commit(1, vec![record]).unwrap();

        let values = store
            .get_values(&DbName::from("db1"), &Key::from_str("key1"))
            .unwrap();
        assert_eq!(values, vec![(b"v1".to_vec(), Metadata::new(Version::new(1, 0)))]);
        assert_eq!(store.get_tx_id_location("tx0").unwrap(), (1, 0));
        assert_eq!(
            store.get_tx_ids_submitted_by_user(&UserId::from("alice")).unwrap(),
            vec!["tx0".to_string()]
        );
    }

    #[test]
    fn multi_db_tx_gets_one_location_and_one_user_index_entry() {
        let store = InMemoryProvenanceStore::new();
        let db1_record = record_write("db1", "tx0", "alice", "key1", b"v1", Version::new(1, 0));
        let db2_record = record_write("db2", "tx0", "alice", "key2", b"v2", Version::new(1, 0));
        store.commit(1, vec![db1_record, db2_record]).unwrap();

        assert_eq!(store.get_tx_id_location("tx0").unwrap(), (1, 0));
        assert_eq!(
            store.get_tx_ids_submitted_by_user(&UserId::from("alice")).unwrap(),
            vec!["tx0".to_string()]
        );
    }

    #[test]
    fn commit_rejects_duplicate_tx_id() {
        let store = InMemoryProvenanceStore::new();
        let record1 = record_write("db1", "tx0", "alice", "key1", b"v1", Version::new(1, 0));
        store.commit(1, vec![record1]).unwrap();

        let record2 = record_write("db1", "tx0", "alice", "key2", b"v2", Version::new(2, 0));
        let err = store.commit(2, vec![record2]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn commit_rejects_non_sequential_height() {
        let store = InMemoryProvenanceStore::new();
        let err = store.commit(2, vec![]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn invalid_record_indexes_tx_location_but_no_history() {
        let store = InMemoryProvenanceStore::new();
        let record = TxDataForProvenance::invalid(DbName::from("db1"), "tx0".to_string(), 0);
        store.commit(1, vec![record]).unwrap();

        assert_eq!(store.get_tx_id_location("tx0").unwrap(), (1, 0));
        assert!(store
            .get_values(&DbName::from("db1"), &Key::from_str("key1"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn delete_moves_current_value_into_deleted_index() {
        let store = InMemoryProvenanceStore::new();
        let write = record_write("db1", "tx0", "alice", "key1", b"v1", Version::new(1, 0));
        store.commit(1, vec![write]).unwrap();

        let mut deletes = std::collections::BTreeMap::new();
        deletes.insert(Key::from_str("key1"), Version::new(1, 0));
        let delete_record = TxDataForProvenance {
            is_valid: true,
            db_name: DbName::from("db1"),
            user_id: Some(UserId::from("alice")),
            tx_id: "tx1".to_string(),
            tx_index: 0,
            reads: Vec::new(),
            writes: Vec::new(),
            deletes,
            old_version_of_writes: Default::default(),
        };
        store.commit(2, vec![delete_record]).unwrap();

        let deleted = store
            .get_deleted_values(&DbName::from("db1"), &Key::from_str("key1"))
            .unwrap();
        assert_eq!(deleted, vec![(b"v1".to_vec(), Metadata::new(Version::new(1, 0)))]);
    }

    #[test]
    fn delete_with_mismatched_previous_version_is_rejected() {
        let store = InMemoryProvenanceStore::new();
        let write = record_write("db1", "tx0", "alice", "key1", b"v1", Version::new(1, 0));
        store.commit(1, vec![write]).unwrap();

        let mut deletes = std::collections::BTreeMap::new();
        deletes.insert(Key::from_str("key1"), Version::new(99, 99));
        let delete_record = TxDataForProvenance {
            is_valid: true,
            db_name: DbName::from("db1"),
            user_id: Some(UserId::from("alice")),
            tx_id: "tx1".to_string(),
            tx_index: 0,
            reads: Vec::new(),
            writes: Vec::new(),
            deletes,
            old_version_of_writes: Default::default(),
        };
        let err = store.commit(2, vec![delete_record]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn reads_are_recorded_per_user_when_version_matches() {
        let store = InMemoryProvenanceStore::new();
        let write = record_write("db1", "tx0", "alice", "key1", b"v1", Version::new(1, 0));
        store.commit(1, vec![write]).unwrap();

        let read_record = TxDataForProvenance {
            is_valid: true,
            db_name: DbName::from("db1"),
            user_id: Some(UserId::from("bob")),
            tx_id: "tx1".to_string(),
            tx_index: 0,
            reads: vec![(Key::from_str("key1"), Version::new(1, 0))],
            writes: Vec::new(),
            deletes: Default::default(),
            old_version_of_writes: Default::default(),
        };
        store.commit(2, vec![read_record]).unwrap();

        let reads = store.get_values_read_by_user(&UserId::from("bob")).unwrap();
        assert_eq!(
            reads,
            vec![(
                DbName::from("db1"),
                Key::from_str("key1"),
                b"v1".to_vec(),
                Metadata::new(Version::new(1, 0))
            )]
        );
    }

    #[test]
    fn get_previous_and_next_values_respect_ordering_and_limit() {
        let store = InMemoryProvenanceStore::new();
        store
            .commit(
                1,
                vec![record_write("db1", "tx0", "alice", "key1", b"v1", Version::new(1, 0))],
            )
            .unwrap();
        store
            .commit(
                2,
                vec![record_write("db1", "tx1", "alice", "key1", b"v2", Version::new(2, 0))],
            )
            .unwrap();
        store
            .commit(
                3,
                vec![record_write("db1", "tx2", "alice", "key1", b"v3", Version::new(3, 0))],
            )
            .unwrap();

        let previous = store
            .get_previous_values(&DbName::from("db1"), &Key::from_str("key1"), Version::new(3, 0), None)
            .unwrap();
        assert_eq!(
            previous,
            vec![
                (b"v2".to_vec(), Metadata::new(Version::new(2, 0))),
                (b"v1".to_vec(), Metadata::new(Version::new(1, 0))),
            ]
        );

        let next = store
            .get_next_values(&DbName::from("db1"), &Key::from_str("key1"), Version::new(1, 0), Some(1))
            .unwrap();
        assert_eq!(next, vec![(b"v2".to_vec(), Metadata::new(Version::new(2, 0)))]);
    }

    #[test]
    fn unknown_tx_id_is_not_found() {
        let store = InMemoryProvenanceStore::new();
        let err = store.get_tx_id_location("nope").unwrap_err();
        assert!(matches!(err, LedgerError::TxIdNotFound(_)));
    }
}
