use async_trait::async_trait;

use super::support::{probe_position, select_candidate, wait_for_catchup};
use crate::command::Command;
use crate::dto::{GroupInfo, ServerInfo};
use crate::error::{CoreError, GroupError};
use crate::events::Handler;
use crate::gateway::{ConnectionPool, Transaction};
use crate::model::{Group, MySqlConnector, ReplicationRole, Server, ServerMode};

pub struct GroupCreate;

#[async_trait]
impl Handler for GroupCreate {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupCreate { group_id, description } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupCreate");
        };
        if txn.state().groups.contains_key(group_id) {
            return Err(GroupError::AlreadyExists(group_id.clone()).into());
        }
        txn.state_mut()
            .groups
            .insert(group_id.clone(), Group::new(group_id.clone(), description.clone()));
        Ok(format!("created group \"{group_id}\""))
    }
}

pub struct GroupDestroy;

#[async_trait]
impl Handler for GroupDestroy {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupDestroy { group_id, force } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupDestroy");
        };
        if !txn.state().groups.contains_key(group_id) {
            return Err(GroupError::NotFound(group_id.clone()).into());
        }
        let members: Vec<_> = txn
            .state()
            .servers_in_group(group_id)
            .into_iter()
            .map(|s| s.id)
            .collect();
        if !members.is_empty() && !force {
            return Err(GroupError::NotEmpty(group_id.clone()).into());
        }
        for id in &members {
            txn.state_mut().servers.remove(id);
            pool.purge_connections(*id);
        }
        txn.state_mut().groups.remove(group_id);
        Ok(format!("destroyed group \"{group_id}\""))
    }
}

pub struct GroupAdd;

#[async_trait]
impl Handler for GroupAdd {
    async fn run(
        &self,
        txn: &mut Transaction,
        connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupAdd { group_id, address, user, password } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupAdd");
        };
        if !txn.state().groups.contains_key(group_id) {
            return Err(GroupError::NotFound(group_id.clone()).into());
        }
        let addr = crate::model::Address::parse(address)
            .ok_or_else(|| CoreError::Usage(format!("invalid address \"{address}\"")))?;
        let uuid = connector.discover_uuid(&addr, user, password).await?;
        if txn.state().servers.contains_key(&uuid) {
            return Err(crate::model::ServerError::AlreadyRegistered(address.clone(), uuid).into());
        }

        // Reject servers too old to support the replication primitives the
        // fleet relies on (mirrors the reference implementation's
        // check_version_compat on group.add).
        let minimum = fabric_config::config().config.general.min_server_version;
        let conn = connector.connect(&addr, user, password).await?;
        let found = conn.server_version().await?;
        let parsed = fabric_config::MinServerVersion::parse(&found);
        conn.disconnect().await?;
        if parsed.map(|v| v < minimum).unwrap_or(true) {
            return Err(crate::model::ServerError::VersionMismatch {
                found,
                minimum: minimum.to_string(),
            }
            .into());
        }
        let has_master = txn
            .state()
            .groups
            .get(group_id)
            .and_then(|g| g.master)
            .is_some();
        let mut server = Server::new(uuid, address.clone(), user.clone(), password.clone());
        server.group_id = Some(group_id.clone());
        // The group's first member has nothing to replicate from yet; later
        // members start SECONDARY and are promoted explicitly (§4.F).
        server.role = if has_master {
            ReplicationRole::Secondary
        } else {
            ReplicationRole::Spare
        };
        txn.state_mut().servers.insert(uuid, server);
        Ok(format!("added server {uuid} to group \"{group_id}\""))
    }
}

pub struct GroupRemove;

#[async_trait]
impl Handler for GroupRemove {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupRemove { group_id, server_id } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupRemove");
        };
        let group = txn
            .state()
            .groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| GroupError::NotFound(group_id.clone()))?;
        let server = txn
            .state()
            .servers
            .get(server_id)
            .cloned()
            .ok_or_else(|| GroupError::ServerNotInGroup(server_id.to_string(), group_id.clone()))?;
        if server.group_id.as_deref() != Some(group_id.as_str()) {
            return Err(GroupError::ServerNotInGroup(server_id.to_string(), group_id.clone()).into());
        }
        if group.master == Some(*server_id) {
            return Err(GroupError::CannotRemoveMaster(server_id.to_string()).into());
        }
        txn.state_mut().servers.remove(server_id);
        pool.purge_connections(*server_id);
        Ok(format!("removed server {server_id} from group \"{group_id}\""))
    }
}

pub struct GroupPromote;

#[async_trait]
impl Handler for GroupPromote {
    async fn run(
        &self,
        txn: &mut Transaction,
        connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupPromote { group_id, candidate } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupPromote");
        };
        let group = txn
            .state()
            .groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| GroupError::NotFound(group_id.clone()))?;

        let old_master = group.master.and_then(|id| txn.state().servers.get(&id).cloned());
        let master_position = match &old_master {
            Some(master) => probe_position(connector, master).await,
            None => 0,
        };

        let candidate_id = match candidate {
            Some(id) => *id,
            None => {
                let members = txn.state().servers_in_group(group_id);
                let pool: Vec<&Server> = members
                    .into_iter()
                    .filter(|s| group.master != Some(s.id) && s.role != ReplicationRole::Faulty)
                    .collect();
                select_candidate(connector, group_id, &pool, master_position).await?
            }
        };
        let mut candidate_server = txn
            .state()
            .servers
            .get(&candidate_id)
            .cloned()
            .ok_or_else(|| GroupError::ServerNotInGroup(candidate_id.to_string(), group_id.clone()))?;
        if candidate_server.group_id.as_deref() != Some(group_id.as_str()) {
            return Err(GroupError::ServerNotInGroup(candidate_id.to_string(), group_id.clone()).into());
        }

        wait_for_catchup(connector, &candidate_server, master_position).await?;

        // Detach the candidate, point remaining secondaries at it, swap roles.
        let candidate_address = super::support::parse_address(&candidate_server)?;
        let conn = connector
            .connect(&candidate_address, &candidate_server.user, &candidate_server.password)
            .await?;
        conn.set_replication_source(None).await?;
        conn.disconnect().await?;

        let sibling_ids: Vec<_> = txn
            .state()
            .servers_in_group(group_id)
            .into_iter()
            .filter(|s| s.id != candidate_id && Some(s.id) != group.master)
            .map(|s| s.id)
            .collect();
        for id in sibling_ids {
            if let Some(sibling) = txn.state().servers.get(&id).cloned() {
                let address = super::support::parse_address(&sibling)?;
                let conn = connector.connect(&address, &sibling.user, &sibling.password).await?;
                conn.set_replication_source(Some(candidate_address.clone())).await?;
            }
        }

        candidate_server.role = ReplicationRole::Primary;
        candidate_server.mode = ServerMode::ReadWrite;
        candidate_server.last_known_binlog_position = master_position;
        txn.state_mut().servers.insert(candidate_id, candidate_server);
        if let Some(mut master) = old_master.clone() {
            master.role = ReplicationRole::Secondary;
            master.mode = ServerMode::ReadOnly;
            txn.state_mut().servers.insert(master.id, master);
        }
        txn.state_mut().groups.get_mut(group_id).unwrap().master = Some(candidate_id);

        repoint_shard_topology(txn, connector, group_id, &candidate_address).await?;

        Ok(format!("promoted {candidate_id} in group \"{group_id}\""))
    }
}

/// Step 4 of group.promote: if this group is a shard-mapping definition's
/// global group, re-point every shard group's master at the new global
/// master; if it's a shard group, re-point its new master at the current
/// global master (or detach it if the definition has none).
async fn repoint_shard_topology(
    txn: &mut Transaction,
    connector: &dyn MySqlConnector,
    group_id: &str,
    new_master_address: &crate::model::Address,
) -> Result<(), CoreError> {
    let as_global: Vec<_> = txn
        .state()
        .definitions
        .values()
        .filter(|d| d.global_group.as_deref() == Some(group_id))
        .map(|d| d.id)
        .collect();
    for definition_id in as_global {
        let shard_groups: Vec<String> = txn
            .state()
            .shards_for_definition(definition_id)
            .into_iter()
            .map(|s| s.group_id.clone())
            .collect();
        for shard_group in shard_groups {
            if let Some(master_id) = txn.state().groups.get(&shard_group).and_then(|g| g.master) {
                if let Some(shard_master) = txn.state().servers.get(&master_id).cloned() {
                    let address = super::support::parse_address(&shard_master)?;
                    let conn = connector
                        .connect(&address, &shard_master.user, &shard_master.password)
                        .await?;
                    conn.set_replication_source(Some(new_master_address.clone())).await?;
                }
            }
        }
    }

    let as_shard = txn
        .state()
        .shards
        .values()
        .find(|s| s.group_id == group_id)
        .map(|s| s.definition_id);
    if let Some(definition_id) = as_shard {
        let global_master_address = txn
            .state()
            .definitions
            .get(&definition_id)
            .and_then(|d| d.global_group.clone())
            .and_then(|global_id| txn.state().groups.get(&global_id).and_then(|g| g.master))
            .and_then(|id| txn.state().servers.get(&id).cloned())
            .map(|s| super::support::parse_address(&s))
            .transpose()?;
        if let Some(new_master) = txn.state().groups.get(group_id).and_then(|g| g.master) {
            if let Some(server) = txn.state().servers.get(&new_master).cloned() {
                let address = super::support::parse_address(&server)?;
                let conn = connector.connect(&address, &server.user, &server.password).await?;
                conn.set_replication_source(global_master_address).await?;
            }
        }
    }
    Ok(())
}

pub struct GroupDemote;

#[async_trait]
impl Handler for GroupDemote {
    async fn run(
        &self,
        txn: &mut Transaction,
        connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupDemote { group_id } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupDemote");
        };
        let group = txn
            .state()
            .groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| GroupError::NotFound(group_id.clone()))?;
        let Some(master_id) = group.master else {
            return Err(GroupError::NoMaster(group_id.clone()).into());
        };
        if let Some(mut master) = txn.state().servers.get(&master_id).cloned() {
            master.mode = ServerMode::ReadOnly;
            master.role = ReplicationRole::Secondary;
            txn.state_mut().servers.insert(master_id, master);
        }
        txn.state_mut().groups.get_mut(group_id).unwrap().master = None;

        // If this was a global group, detach every shard group from it.
        let definitions: Vec<_> = txn
            .state()
            .definitions
            .values()
            .filter(|d| d.global_group.as_deref() == Some(group_id.as_str()))
            .map(|d| d.id)
            .collect();
        for definition_id in definitions {
            let shard_groups: Vec<String> = txn
                .state()
                .shards_for_definition(definition_id)
                .into_iter()
                .map(|s| s.group_id.clone())
                .collect();
            for shard_group in shard_groups {
                if let Some(master_id) = txn.state().groups.get(&shard_group).and_then(|g| g.master) {
                    if let Some(server) = txn.state().servers.get(&master_id).cloned() {
                        let address = super::support::parse_address(&server)?;
                        let conn = connector.connect(&address, &server.user, &server.password).await?;
                        conn.set_replication_source(None).await?;
                    }
                }
            }
        }
        Ok(format!("demoted group \"{group_id}\""))
    }
}

pub struct GroupLookupGroups;

#[async_trait]
impl Handler for GroupLookupGroups {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupLookupGroups { group_id } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupLookupGroups");
        };
        let to_info = |g: &Group| GroupInfo {
            id: g.id.clone(),
            description: g.description.clone(),
            master: g.master,
            status: g.status,
        };
        let payload = match group_id {
            Some(id) => {
                let group = txn
                    .state()
                    .groups
                    .get(id)
                    .ok_or_else(|| GroupError::NotFound(id.clone()))?;
                serde_json::to_string(&to_info(group))
            }
            None => {
                let groups: Vec<GroupInfo> = txn.state().groups.values().map(to_info).collect();
                serde_json::to_string(&groups)
            }
        };
        payload.map_err(|e| CoreError::Usage(e.to_string()))
    }
}

pub struct GroupLookupServers;

#[async_trait]
impl Handler for GroupLookupServers {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupLookupServers { group_id, server_id } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupLookupServers");
        };
        let group = txn
            .state()
            .groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| GroupError::NotFound(group_id.clone()))?;
        let to_info = |s: &Server| ServerInfo {
            id: s.id,
            address: s.address.clone(),
            is_master: group.master == Some(s.id),
            role: s.role,
            mode: s.mode,
        };
        let payload = match server_id {
            Some(id) => {
                let server = txn
                    .state()
                    .servers
                    .get(id)
                    .filter(|s| s.group_id.as_deref() == Some(group_id.as_str()))
                    .ok_or_else(|| GroupError::ServerNotInGroup(id.to_string(), group_id.clone()))?;
                serde_json::to_string(&to_info(server))
            }
            None => {
                let servers: Vec<ServerInfo> =
                    txn.state().servers_in_group(group_id).into_iter().map(to_info).collect();
                serde_json::to_string(&servers)
            }
        };
        payload.map_err(|e| CoreError::Usage(e.to_string()))
    }
}

pub struct GroupDescription;

#[async_trait]
impl Handler for GroupDescription {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::GroupDescription { group_id, description } = command else {
            unreachable!("dispatcher routed a mismatched command to GroupDescription");
        };
        let group = txn
            .state_mut()
            .groups
            .get_mut(group_id)
            .ok_or_else(|| GroupError::NotFound(group_id.clone()))?;
        if let Some(new_description) = description {
            group.description = Some(new_description.clone());
            Ok(format!("set description for group \"{group_id}\""))
        } else {
            Ok(group.description.clone().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, MemoryGateway};
    use crate::model::{Address, FakeMySqlConnector, Group, ReplicationRole};

    fn txn_over(gateway: &MemoryGateway) -> Transaction {
        gateway.begin()
    }

    #[tokio::test]
    async fn create_rejects_duplicate_group() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let mut txn = txn_over(&gateway);
        GroupCreate
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupCreate { group_id: "G1".into(), description: None },
            )
            .await
            .unwrap();
        txn.commit().unwrap();

        let mut txn = txn_over(&gateway);
        let err = GroupCreate
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupCreate { group_id: "G1".into(), description: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Group(GroupError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn add_starts_spare_before_a_master_exists_secondary_after() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let addr_a = Address::parse("127.0.0.1:3306").unwrap();
        let addr_b = Address::parse("127.0.0.1:3307").unwrap();
        let uuid_a = connector.add_server(addr_a.clone(), "5.7.30");
        connector.add_server(addr_b.clone(), "5.7.30");

        let mut txn = txn_over(&gateway);
        txn.state_mut().groups.insert("G1".into(), Group::new("G1", None));
        GroupAdd
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupAdd {
                    group_id: "G1".into(),
                    address: addr_a.to_string(),
                    user: "root".into(),
                    password: "".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(txn.state().servers.get(&uuid_a).unwrap().role, ReplicationRole::Spare);

        // Simulate a master having been elected since the first add.
        txn.state_mut().groups.get_mut("G1").unwrap().master = Some(uuid_a);
        GroupAdd
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupAdd {
                    group_id: "G1".into(),
                    address: addr_b.to_string(),
                    user: "root".into(),
                    password: "".into(),
                },
            )
            .await
            .unwrap();

        let roles: Vec<ReplicationRole> = txn
            .state()
            .servers_in_group("G1")
            .into_iter()
            .map(|s| s.role)
            .collect();
        assert!(roles.contains(&ReplicationRole::Spare));
        assert!(roles.contains(&ReplicationRole::Secondary));
    }

    #[tokio::test]
    async fn add_rejects_a_server_older_than_the_configured_minimum() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let addr = Address::parse("127.0.0.1:3306").unwrap();
        connector.add_server(addr.clone(), "5.5.40");

        let mut txn = txn_over(&gateway);
        txn.state_mut().groups.insert("G1".into(), Group::new("G1", None));
        let err = GroupAdd
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupAdd {
                    group_id: "G1".into(),
                    address: addr.to_string(),
                    user: "root".into(),
                    password: "".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Server(crate::model::ServerError::VersionMismatch { .. })
        ));
        assert!(txn.state().servers.is_empty());
    }

    #[tokio::test]
    async fn remove_refuses_to_drop_the_master() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let addr = Address::parse("127.0.0.1:3306").unwrap();
        let uuid = connector.add_server(addr.clone(), "5.7.30");

        let mut txn = txn_over(&gateway);
        let mut group = Group::new("G1", None);
        group.master = Some(uuid);
        txn.state_mut().groups.insert("G1".into(), group);
        let mut server = Server::new(uuid, addr.to_string(), "root", "");
        server.group_id = Some("G1".into());
        txn.state_mut().servers.insert(uuid, server);

        let err = GroupRemove
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupRemove { group_id: "G1".into(), server_id: uuid },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Group(GroupError::CannotRemoveMaster(_))));
    }

    #[tokio::test]
    async fn remove_purges_the_departed_servers_pooled_connections() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let addr = Address::parse("127.0.0.1:3306").unwrap();
        let uuid = connector.add_server(addr.clone(), "5.7.30");
        let conn = connector.connect(&addr, "root", "").await.unwrap();
        gateway.pool().checkin(uuid, conn);
        assert_eq!(gateway.pool().live_count(uuid), 1);

        let mut txn = txn_over(&gateway);
        let mut group = Group::new("G1", None);
        group.master = None;
        txn.state_mut().groups.insert("G1".into(), group);
        let mut server = Server::new(uuid, addr.to_string(), "root", "");
        server.group_id = Some("G1".into());
        txn.state_mut().servers.insert(uuid, server);

        GroupRemove
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupRemove { group_id: "G1".into(), server_id: uuid },
            )
            .await
            .unwrap();
        assert_eq!(gateway.pool().live_count(uuid), 0);
    }

    #[tokio::test]
    async fn destroy_purges_every_members_pooled_connections() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let addr = Address::parse("127.0.0.1:3306").unwrap();
        let uuid = connector.add_server(addr.clone(), "5.7.30");
        let conn = connector.connect(&addr, "root", "").await.unwrap();
        gateway.pool().checkin(uuid, conn);

        let mut txn = txn_over(&gateway);
        let group = Group::new("G1", None);
        txn.state_mut().groups.insert("G1".into(), group);
        let mut server = Server::new(uuid, addr.to_string(), "root", "");
        server.group_id = Some("G1".into());
        txn.state_mut().servers.insert(uuid, server);

        GroupDestroy
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::GroupDestroy { group_id: "G1".into(), force: true },
            )
            .await
            .unwrap();
        assert_eq!(gateway.pool().live_count(uuid), 0);
    }

    #[tokio::test]
    async fn promote_picks_least_lagging_candidate() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let master_addr = Address::parse("127.0.0.1:3306").unwrap();
        let fast_addr = Address::parse("127.0.0.1:3307").unwrap();
        let slow_addr = Address::parse("127.0.0.1:3308").unwrap();
        let master_id = connector.add_server(master_addr.clone(), "5.7.30");
        let fast_id = connector.add_server(fast_addr.clone(), "5.7.30");
        let slow_id = connector.add_server(slow_addr.clone(), "5.7.30");

        {
            let conn = connector.connect(&fast_addr, "root", "").await.unwrap();
            conn.set_replication_source(Some(master_addr.clone())).await.unwrap();
        }
        {
            let conn = connector.connect(&slow_addr, "root", "").await.unwrap();
            conn.set_replication_source(Some(master_addr.clone())).await.unwrap();
        }
        connector.write(&master_addr).unwrap();
        connector.write(&master_addr).unwrap();
        // fast_addr caught up with the master via replication; slow_addr
        // never got the second write because we detach it below first.
        {
            let conn = connector.connect(&slow_addr, "root", "").await.unwrap();
            conn.set_replication_source(None).await.unwrap();
        }
        connector.write(&master_addr).unwrap();

        let mut txn = txn_over(&gateway);
        let mut group = Group::new("G1", None);
        group.master = Some(master_id);
        txn.state_mut().groups.insert("G1".into(), group);
        for (id, addr, role) in [
            (master_id, &master_addr, ReplicationRole::Primary),
            (fast_id, &fast_addr, ReplicationRole::Secondary),
            (slow_id, &slow_addr, ReplicationRole::Secondary),
        ] {
            let mut server = Server::new(id, addr.to_string(), "root", "");
            server.group_id = Some("G1".into());
            server.role = role;
            txn.state_mut().servers.insert(id, server);
        }

        GroupPromote
            .run(&mut txn, &connector, gateway.pool(), &Command::GroupPromote { group_id: "G1".into(), candidate: None })
            .await
            .unwrap();

        assert_eq!(txn.state().groups.get("G1").unwrap().master, Some(fast_id));
    }

    #[tokio::test]
    async fn lookup_groups_rejects_unknown_group() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let mut txn = txn_over(&gateway);
        let err = GroupLookupGroups
            .run(&mut txn, &connector, gateway.pool(), &Command::GroupLookupGroups { group_id: Some("nope".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Group(GroupError::NotFound(_))));
    }

    #[tokio::test]
    async fn description_read_without_arg_returns_current_value() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let mut txn = txn_over(&gateway);
        txn.state_mut()
            .groups
            .insert("G1".into(), Group::new("G1", Some("fleet primary".into())));
        let result = GroupDescription
            .run(&mut txn, &connector, gateway.pool(), &Command::GroupDescription { group_id: "G1".into(), description: None })
            .await
            .unwrap();
        assert_eq!(result, "fleet primary");
    }
}
