//! Black-box scenario tests exercising the committer through its public
//! facade only, mirroring the committer's own concrete test scenarios.
//!
//! Each test below stands up a fresh set of in-memory stores and drives
//! them only through [`Committer::commit`] and the store read APIs —
//! nothing here reaches into a crate-internal module.

use std::collections::BTreeMap;

use permissioned_ledger::{
    Acl, Block, ClusterConfig, Committer, CommitterConfig, ConfigTx, DataTx, DataWrite,
    DbAdministrationTx, DbName, DbOperation, Flag, InMemoryBlockStore, InMemoryProvenanceStore,
    InMemoryTrieBackend, InMemoryWorldState, Key, MerklePatriciaTrie, NodeConfig, Payload,
    Privilege, User, UserAdministrationTx, UserWrite, Version,
};

type Ledger = Committer<
    InMemoryBlockStore,
    InMemoryWorldState,
    InMemoryProvenanceStore,
    MerklePatriciaTrie<InMemoryTrieBackend>,
>;

fn fresh_ledger() -> Ledger {
    Committer::new(
        InMemoryBlockStore::new(),
        InMemoryWorldState::new(),
        InMemoryProvenanceStore::new(),
        MerklePatriciaTrie::new(InMemoryTrieBackend::new()),
        CommitterConfig::default(),
    )
}

fn data_tx(db: &str, key: &str, value: &str) -> DataTx {
    DataTx {
        tx_id: format!("{db}-{key}-write"),
        must_sign_user_ids: vec!["alice".into()],
        db_operations: vec![DbOperation {
            db_name: DbName::from(db),
            reads: vec![],
            writes: vec![DataWrite {
                key: Key::from_str(key),
                value: value.as_bytes().to_vec(),
                acl: None,
            }],
            deletes: vec![],
        }],
    }
}

fn acl() -> Option<Acl> {
    None
}

/// S1 — a fresh block of writes across three pre-created databases.
#[test]
fn s1_fresh_data_block() {
    let mut ledger = fresh_ledger();

    let create = DbAdministrationTx {
        tx_id: "create-dbs".into(),
        user_id: "admin1".into(),
        create_dbs: vec![DbName::from("db1"), DbName::from("db2"), DbName::from("db3")],
        delete_dbs: vec![],
        dbs_index: BTreeMap::new(),
    };
    ledger
        .commit(Block::new(1, vec![Flag::Valid], Payload::DbAdministration(create)))
        .unwrap();

    let tx = DataTx {
        tx_id: "multi-db-write".into(),
        must_sign_user_ids: vec!["alice".into()],
        db_operations: vec![
            DbOperation {
                db_name: DbName::from("db1"),
                reads: vec![],
                writes: vec![DataWrite { key: Key::from_str("db1-key1"), value: b"value-1".to_vec(), acl: acl() }],
                deletes: vec![],
            },
            DbOperation {
                db_name: DbName::from("db2"),
                reads: vec![],
                writes: vec![DataWrite { key: Key::from_str("db2-key1"), value: b"value-1".to_vec(), acl: acl() }],
                deletes: vec![],
            },
            DbOperation {
                db_name: DbName::from("db3"),
                reads: vec![],
                writes: vec![DataWrite { key: Key::from_str("db3-key1"), value: b"value-1".to_vec(), acl: acl() }],
                deletes: vec![],
            },
        ],
    };
    ledger
        .commit(Block::new(2, vec![Flag::Valid], Payload::Data(vec![tx])))
        .unwrap();

    assert_eq!(ledger.block_store().height(), 2);
    for (db, key) in [("db1", "db1-key1"), ("db2", "db2-key1"), ("db3", "db3-key1")] {
        let (_, metadata) = ledger
            .world_state()
            .get(&DbName::from(db), &Key::from_str(key))
            .unwrap()
            .unwrap();
        assert_eq!(metadata.version, Version::new(2, 0));
    }

    let committed = ledger.block_store().get(2).unwrap().unwrap();
    assert_eq!(ledger.trie_hash().unwrap(), committed.header.state_root);

    // The tx touches three databases and so produces three provenance
    // records, but it is still transaction 0 in the block.
    assert_eq!(
        ledger.provenance_store().get_tx_id_location("multi-db-write").unwrap(),
        (2, 0)
    );
}

/// S2 — within one block: write, delete, then rewrite the same key.
#[test]
fn s2_in_block_blind_write_delete_write() {
    let mut ledger = fresh_ledger();
    ledger
        .commit(Block::new(1, vec![Flag::Valid], Payload::Data(vec![data_tx("db1", "key0", "value0")])))
        .unwrap();

    let write_tx = |tx_id: &str, value: &str| DataTx {
        tx_id: tx_id.into(),
        must_sign_user_ids: vec!["alice".into()],
        db_operations: vec![DbOperation {
            db_name: DbName::from("db1"),
            reads: vec![],
            writes: vec![DataWrite { key: Key::from_str("key0"), value: value.as_bytes().to_vec(), acl: None }],
            deletes: vec![],
        }],
    };
    let delete_tx = DataTx {
        tx_id: "tx1-delete".into(),
        must_sign_user_ids: vec!["alice".into()],
        db_operations: vec![DbOperation {
            db_name: DbName::from("db1"),
            reads: vec![],
            writes: vec![],
            deletes: vec![Key::from_str("key0")],
        }],
    };

    ledger
        .commit(Block::new(
            2,
            vec![Flag::Valid, Flag::Valid, Flag::Valid],
            Payload::Data(vec![write_tx("tx0-write", "value1"), delete_tx, write_tx("tx2-write", "value2")]),
        ))
        .unwrap();

    let (value, metadata) = ledger
        .world_state()
        .get(&DbName::from("db1"), &Key::from_str("key0"))
        .unwrap()
        .unwrap();
    assert_eq!(value, b"value2");
    assert_eq!(metadata.version, Version::new(2, 2));

    let history: Vec<_> = ledger
        .provenance_store()
        .get_values(&DbName::from("db1"), &Key::from_str("key0"))
        .unwrap()
        .into_iter()
        .map(|(v, _)| v)
        .collect();
    assert_eq!(history, vec![b"value0".to_vec(), b"value1".to_vec(), b"value2".to_vec()]);
}

/// S3 — a block whose last transaction is an in-block MVCC conflict: it
/// contributes only a tx-id location, no state mutation.
#[test]
fn s3_in_block_mvcc_invalid_tail() {
    let mut ledger = fresh_ledger();

    let valid_tx = |key: &str| data_tx("db1", key, "v");
    let invalid_tx = DataTx {
        tx_id: "tx4-invalid".into(),
        must_sign_user_ids: vec!["alice".into()],
        db_operations: vec![DbOperation {
            db_name: DbName::from("db1"),
            reads: vec![],
            writes: vec![DataWrite { key: Key::from_str("key4"), value: b"v".to_vec(), acl: None }],
            deletes: vec![],
        }],
    };

    ledger
        .commit(Block::new(
            2,
            vec![Flag::Valid, Flag::Valid, Flag::Valid, Flag::Valid, Flag::InvalidMvccConflictWithinBlock],
            Payload::Data(vec![
                valid_tx("key1"),
                valid_tx("key2"),
                valid_tx("key3"),
                valid_tx("key0"),
                invalid_tx,
            ]),
        ))
        .unwrap();

    assert_eq!(ledger.provenance_store().get_tx_id_location("tx4-invalid").unwrap(), (2, 4));
    assert!(ledger
        .world_state()
        .get(&DbName::from("db1"), &Key::from_str("key4"))
        .unwrap()
        .is_none());
    assert!(ledger
        .world_state()
        .get(&DbName::from("db1"), &Key::from_str("key1"))
        .unwrap()
        .is_some());
}

/// S4 — a block submitted out of height order is rejected.
#[test]
fn s4_out_of_order_block_rejected() {
    let mut ledger = fresh_ledger();
    let err = ledger
        .commit(Block::new(10, vec![], Payload::Data(vec![])))
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(ledger.block_store().height(), 0);
}

fn admin(id: &str) -> User {
    User { id: id.into(), certificate: vec![], privilege: Privilege::Admin }
}

fn node(id: &str) -> NodeConfig {
    NodeConfig { id: id.into(), address: format!("{id}:7050"), certificate: vec![] }
}

/// S5 — config rotation: admins and nodes both diffed and re-written.
#[test]
fn s5_config_rotation() {
    let mut ledger = fresh_ledger();

    let first = ConfigTx {
        tx_id: "config-1".into(),
        user_id: "admin1".into(),
        new_config: ClusterConfig {
            nodes: vec![node("N1"), node("N2"), node("N3")],
            admins: vec![admin("A1"), admin("A2"), admin("A3")],
            cert_auth_config: Default::default(),
        },
        read_old_config_version: None,
    };
    ledger
        .commit(Block::new(1, vec![Flag::Valid], Payload::Config(first)))
        .unwrap();

    let second = ConfigTx {
        tx_id: "config-2".into(),
        user_id: "admin1".into(),
        new_config: ClusterConfig {
            nodes: vec![node("N3"), node("N4"), node("N5")],
            admins: vec![admin("A3"), admin("A4"), admin("A5")],
            cert_auth_config: Default::default(),
        },
        read_old_config_version: Some(Version::new(1, 0)),
    };
    ledger
        .commit(Block::new(2, vec![Flag::Valid], Payload::Config(second)))
        .unwrap();

    for present in ["A3", "A4", "A5"] {
        assert!(ledger
            .world_state()
            .get(&DbName::from(DbName::USERS), &Key::from_str(present))
            .unwrap()
            .is_some());
    }
    for gone in ["A1", "A2"] {
        assert!(ledger
            .world_state()
            .get(&DbName::from(DbName::USERS), &Key::from_str(gone))
            .unwrap()
            .is_none());
    }
    for present in ["N3", "N4", "N5"] {
        assert!(ledger
            .world_state()
            .get(&DbName::from(DbName::CONFIG), &Key::from_str(present))
            .unwrap()
            .is_some());
    }

    let previous = ledger
        .provenance_store()
        .get_previous_values(
            &DbName::from(DbName::CONFIG),
            &Key::from_str(DbName::CONFIG_KEY),
            Version::new(2, 0),
            None,
        )
        .unwrap();
    assert_eq!(previous.len(), 1);
    assert_eq!(previous[0].1.version, Version::new(1, 0));
}

/// S6 — db-admin create + re-index + schema clear.
#[test]
fn s6_db_index_redefinition() {
    use ledger_codec_reexport::{decode_index_schema, IndexAttributeType, IndexSchema};

    let mut ledger = fresh_ledger();

    let create = DbAdministrationTx {
        tx_id: "create-1-2".into(),
        user_id: "admin1".into(),
        create_dbs: vec![DbName::from("db1"), DbName::from("db2")],
        delete_dbs: vec![],
        dbs_index: BTreeMap::new(),
    };
    ledger
        .commit(Block::new(1, vec![Flag::Valid], Payload::DbAdministration(create)))
        .unwrap();

    let mut schema = IndexSchema::new();
    schema.insert("attr1".to_string(), IndexAttributeType::Boolean);
    schema.insert("attr2".to_string(), IndexAttributeType::Number);

    let mut dbs_index = BTreeMap::new();
    dbs_index.insert(DbName::from("db1"), Some(schema.clone()));
    dbs_index.insert(DbName::from("db2"), None);

    let reindex = DbAdministrationTx {
        tx_id: "reindex".into(),
        user_id: "admin1".into(),
        create_dbs: vec![DbName::from("db3"), DbName::from("db4")],
        delete_dbs: vec![],
        dbs_index: {
            let mut m = dbs_index;
            m.insert(DbName::from("db3"), Some(schema.clone()));
            m
        },
    };
    ledger
        .commit(Block::new(2, vec![Flag::Valid], Payload::DbAdministration(reindex)))
        .unwrap();

    let dbs = DbName::from(DbName::DBS);
    let (value_db1, _) = ledger.world_state().get(&dbs, &Key::from_str("db1")).unwrap().unwrap();
    assert_eq!(decode_index_schema(&value_db1).unwrap(), Some(schema.clone()));

    let (value_db3, _) = ledger.world_state().get(&dbs, &Key::from_str("db3")).unwrap().unwrap();
    assert_eq!(decode_index_schema(&value_db3).unwrap(), Some(schema));

    let (value_db2, _) = ledger.world_state().get(&dbs, &Key::from_str("db2")).unwrap().unwrap();
    assert!(value_db2.is_empty());

    let (value_db4, _) = ledger.world_state().get(&dbs, &Key::from_str("db4")).unwrap().unwrap();
    assert!(value_db4.is_empty());
}

/// S7 is covered in `crates/committer/src/committer.rs`'s
/// `db_admin_create_dbs_then_data_writes_match_trie_root_on_replica` test
/// and exercised further by `ledger-cli check-determinism`.
#[test]
fn user_administration_writes_and_deletes() {
    let mut ledger = fresh_ledger();
    let tx = UserAdministrationTx {
        tx_id: "user-admin-1".into(),
        user_id: "admin1".into(),
        user_writes: vec![UserWrite {
            user: User { id: "bob".into(), certificate: b"cert".to_vec(), privilege: Privilege::User },
        }],
        user_deletes: vec![],
    };
    ledger
        .commit(Block::new(1, vec![Flag::Valid], Payload::UserAdministration(tx)))
        .unwrap();

    assert!(ledger
        .world_state()
        .get(&DbName::from(DbName::USERS), &Key::from_str("bob"))
        .unwrap()
        .is_some());

    let delete_tx = UserAdministrationTx {
        tx_id: "user-admin-2".into(),
        user_id: "admin1".into(),
        user_writes: vec![],
        user_deletes: vec!["bob".into()],
    };
    ledger
        .commit(Block::new(2, vec![Flag::Valid], Payload::UserAdministration(delete_tx)))
        .unwrap();

    assert!(ledger
        .world_state()
        .get(&DbName::from(DbName::USERS), &Key::from_str("bob"))
        .unwrap()
        .is_none());
}

mod ledger_codec_reexport {
    pub use ledger_codec::decode_index_schema;
    pub use ledger_core::{IndexAttributeType, IndexSchema};
}
