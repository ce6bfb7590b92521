//! Config-rotation entry construction (spec §4.5).

use std::collections::BTreeMap;

use ledger_core::{
    ClusterConfig, ConfigTx, DbDelta, DbName, DbOp, Key, Metadata, Result, TxDataForProvenance,
    UserId, Version, WorldDelta, WorldState,
};
use ledger_codec::Codec;

use super::{mark_dirty, version_lookup, DirtyWriteMap};

/// Read and decode the cluster config currently stored at
/// `_config/config`, if any (spec §4.7 `get_config`).
pub fn read_cluster_config<WS: WorldState>(
    world_state: &WS,
) -> Result<Option<(ClusterConfig, Metadata)>> {
    let entry = world_state.get(
        &DbName::from(DbName::CONFIG),
        &Key::from_str(DbName::CONFIG_KEY),
    )?;
    match entry {
        None => Ok(None),
        Some((bytes, metadata)) => {
            let config = ClusterConfig::decode(&bytes)?;
            Ok(Some((config, metadata)))
        }
    }
}

/// Construct the `_users`/`_config` world-state and provenance deltas
/// for one valid config-rotation transaction.
///
/// Three provenance records are produced: the admin diff (against
/// `_users`), the node diff (against `_config`), and the config record
/// itself (spec §4.5 "Provenance records are emitted for all three").
pub fn construct_config_tx_entries<WS: WorldState>(
    tx: &ConfigTx,
    world_state: &WS,
    block_num: u64,
) -> Result<(WorldDelta, Vec<TxDataForProvenance>)> {
    let version = Version::new(block_num, 0);
    let old_config = read_cluster_config(world_state)?.map(|(c, _)| c);

    let users_db = DbName::from(DbName::USERS);
    let config_db = DbName::from(DbName::CONFIG);
    let mut dirty = DirtyWriteMap::default();

    let mut world_delta: WorldDelta = WorldDelta::new();
    let mut admin_record = TxDataForProvenance {
        is_valid: true,
        db_name: users_db.clone(),
        user_id: Some(tx.user_id.clone()),
        tx_id: tx.tx_id.clone(),
        tx_index: 0,
        reads: Vec::new(),
        writes: Vec::new(),
        deletes: Default::default(),
        old_version_of_writes: Default::default(),
    };
    let mut node_record = TxDataForProvenance {
        is_valid: true,
        db_name: config_db.clone(),
        user_id: Some(tx.user_id.clone()),
        tx_id: tx.tx_id.clone(),
        tx_index: 0,
        reads: Vec::new(),
        writes: Vec::new(),
        deletes: Default::default(),
        old_version_of_writes: Default::default(),
    };
    let mut config_record = TxDataForProvenance {
        is_valid: true,
        db_name: config_db.clone(),
        user_id: Some(tx.user_id.clone()),
        tx_id: tx.tx_id.clone(),
        tx_index: 0,
        reads: Vec::new(),
        writes: Vec::new(),
        deletes: Default::default(),
        old_version_of_writes: Default::default(),
    };

    let old_admins: BTreeMap<UserId, _> = old_config
        .as_ref()
        .map(|c| c.admins.iter().map(|u| (u.id.clone(), u.clone())).collect())
        .unwrap_or_default();
    let new_admins: BTreeMap<UserId, _> = tx
        .new_config
        .admins
        .iter()
        .map(|u| (u.id.clone(), u.clone()))
        .collect();

    {
        let db_delta = world_delta.entry(users_db.clone()).or_insert_with(DbDelta::default);
        for (id, user) in &new_admins {
            let changed = old_admins.get(id).map(|old| old != user).unwrap_or(true);
            if !changed {
                continue;
            }
            let key = Key::from(id.0.as_bytes().to_vec());
            let previous = version_lookup(world_state, &dirty, &users_db, &key)?;
            if let Some(prev) = previous {
                admin_record.old_version_of_writes.insert(key.clone(), prev);
            }
            let value = user.encode();
            let metadata = Metadata::new(version);
            db_delta.push_write(key.clone(), value.clone(), metadata.clone());
            admin_record.writes.push((key.clone(), value, metadata));
            mark_dirty(&mut dirty, &users_db, &key, version);
        }
        for id in old_admins.keys() {
            if !new_admins.contains_key(id) {
                let key = Key::from(id.0.as_bytes().to_vec());
                let previous = version_lookup(world_state, &dirty, &users_db, &key)?;
                let previous = super::require_previous_version(&users_db, &key, previous)?;
                admin_record.deletes.insert(key.clone(), previous);
                db_delta.push_delete(key.clone());
                mark_dirty(&mut dirty, &users_db, &key, version);
            }
        }
    }

    let old_nodes: BTreeMap<String, _> = old_config
        .as_ref()
        .map(|c| c.nodes.iter().map(|n| (n.id.clone(), n.clone())).collect())
        .unwrap_or_default();
    let new_nodes: BTreeMap<String, _> = tx
        .new_config
        .nodes
        .iter()
        .map(|n| (n.id.clone(), n.clone()))
        .collect();

    {
        let db_delta = world_delta.entry(config_db.clone()).or_insert_with(DbDelta::default);
        for (id, node) in &new_nodes {
            let changed = old_nodes.get(id).map(|old| old != node).unwrap_or(true);
            if !changed {
                continue;
            }
            let key = Key::from(id.as_bytes().to_vec());
            let previous = version_lookup(world_state, &dirty, &config_db, &key)?;
            if let Some(prev) = previous {
                node_record.old_version_of_writes.insert(key.clone(), prev);
            }
            let value = node.encode();
            let metadata = Metadata::new(version);
            db_delta.push_write(key.clone(), value.clone(), metadata.clone());
            node_record.writes.push((key.clone(), value, metadata));
            mark_dirty(&mut dirty, &config_db, &key, version);
        }
        for id in old_nodes.keys() {
            if !new_nodes.contains_key(id) {
                let key = Key::from(id.as_bytes().to_vec());
                let previous = version_lookup(world_state, &dirty, &config_db, &key)?;
                let previous = super::require_previous_version(&config_db, &key, previous)?;
                node_record.deletes.insert(key.clone(), previous);
                db_delta.push_delete(key.clone());
                mark_dirty(&mut dirty, &config_db, &key, version);
            }
        }

        let config_key = Key::from_str(DbName::CONFIG_KEY);
        let value = tx.new_config.encode();
        let metadata = Metadata::new(version);
        db_delta.push_write(config_key.clone(), value.clone(), metadata.clone());
        config_record.writes.push((config_key.clone(), value, metadata));
        if let Some(old_version) = tx.read_old_config_version {
            config_record
                .old_version_of_writes
                .insert(config_key, old_version);
        }
    }

    Ok((world_delta, vec![admin_record, node_record, config_record]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{CertAuthConfig, NodeConfig, Privilege, User};

    struct StubWorldState(Option<(Vec<u8>, Metadata)>);
    impl WorldState for StubWorldState {
        fn commit(&self, _delta: WorldDelta, _h: u64) -> Result<()> {
            unreachable!()
        }
        fn get(&self, db: &DbName, key: &Key) -> Result<Option<(Vec<u8>, Metadata)>> {
            if db.0 == DbName::CONFIG && key.as_bytes() == DbName::CONFIG_KEY.as_bytes() {
                Ok(self.0.clone())
            } else {
                Ok(None)
            }
        }
        fn exists(&self, _db: &DbName) -> Result<bool> {
            Ok(false)
        }
        fn committed_height(&self) -> u64 {
            0
        }
    }

    fn admin(id: &str) -> User {
        User {
            id: id.into(),
            certificate: vec![],
            privilege: Privilege::Admin,
        }
    }

    fn node(id: &str) -> NodeConfig {
        NodeConfig {
            id: id.into(),
            address: format!("{id}:7050"),
            certificate: vec![],
        }
    }

    fn write_count(delta: &DbDelta) -> usize {
        delta.ops.iter().filter(|op| matches!(op, DbOp::Write(..))).count()
    }

    fn delete_count(delta: &DbDelta) -> usize {
        delta.ops.iter().filter(|op| matches!(op, DbOp::Delete(_))).count()
    }

    #[test]
    fn first_config_block_writes_with_no_backlinks() {
        let tx = ConfigTx {
            tx_id: "tx0".into(),
            user_id: "admin1".into(),
            new_config: ClusterConfig {
                nodes: vec![node("n1")],
                admins: vec![admin("a1")],
                cert_auth_config: CertAuthConfig::default(),
            },
            read_old_config_version: None,
        };
        let ws = StubWorldState(None);
        let (delta, records) = construct_config_tx_entries(&tx, &ws, 1).unwrap();
        assert_eq!(write_count(&delta[&DbName::from(DbName::USERS)]), 1);
        assert_eq!(write_count(&delta[&DbName::from(DbName::CONFIG)]), 2);
        assert_eq!(records.len(), 3);
        assert!(records[2].old_version_of_writes.is_empty());
    }

    #[test]
    fn rotation_diffs_admins_and_nodes() {
        let old = ClusterConfig {
            nodes: vec![node("n1"), node("n2"), node("n3")],
            admins: vec![admin("a1"), admin("a2"), admin("a3")],
            cert_auth_config: CertAuthConfig::default(),
        };
        let ws = StubWorldState(Some((old.encode(), Metadata::new(Version::new(1, 0)))));

        let tx = ConfigTx {
            tx_id: "tx1".into(),
            user_id: "admin1".into(),
            new_config: ClusterConfig {
                nodes: vec![node("n3"), node("n4"), node("n5")],
                admins: vec![admin("a3"), admin("a4"), admin("a5")],
                cert_auth_config: CertAuthConfig::default(),
            },
            read_old_config_version: Some(Version::new(1, 0)),
        };

        let (delta, records) = construct_config_tx_entries(&tx, &ws, 2).unwrap();
        let user_delta = &delta[&DbName::from(DbName::USERS)];
        assert_eq!(write_count(user_delta), 2); // a4, a5 added
        assert_eq!(delete_count(user_delta), 2); // a1, a2 removed

        let config_delta = &delta[&DbName::from(DbName::CONFIG)];
        // n4, n5 written + the config record itself = 3 writes
        assert_eq!(write_count(config_delta), 3);
        assert_eq!(delete_count(config_delta), 2); // n1, n2 removed

        assert_eq!(
            records[2].old_version_of_writes[&Key::from_str(DbName::CONFIG_KEY)],
            Version::new(1, 0)
        );
    }
}
