use async_trait::async_trait;

use crate::command::{Command, LookupHint};
use crate::dto::ServerInfo;
use crate::error::{CoreError, ShardingError};
use crate::events::Handler;
use crate::gateway::{ConnectionPool, Transaction};
use crate::model::{MySqlConnector, RangeSpec, Shard, ShardMapping, ShardMappingDefinition, ShardState};

pub struct CreateDefinition;

#[async_trait]
impl Handler for CreateDefinition {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingCreateDefinition { kind, global_group } = command else {
            unreachable!("dispatcher routed a mismatched command to CreateDefinition");
        };
        if let Some(group_id) = global_group {
            if !txn.state().groups.contains_key(group_id) {
                return Err(crate::error::GroupError::NotFound(group_id.clone()).into());
            }
        }
        let id = txn.state_mut().alloc_definition_id();
        txn.state_mut().definitions.insert(
            id,
            ShardMappingDefinition {
                id,
                kind: *kind,
                global_group: global_group.clone(),
            },
        );
        Ok(id.to_string())
    }
}

pub struct RemoveDefinition;

#[async_trait]
impl Handler for RemoveDefinition {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingRemoveDefinition { definition_id } = command else {
            unreachable!("dispatcher routed a mismatched command to RemoveDefinition");
        };
        if !txn.state().definitions.contains_key(definition_id) {
            return Err(ShardingError::DefinitionNotFound(*definition_id).into());
        }
        if !txn.state().shards_for_definition(*definition_id).is_empty() {
            return Err(ShardingError::InvalidSpecification(format!(
                "definition {definition_id} still has shards"
            ))
            .into());
        }
        txn.state_mut().definitions.remove(definition_id);
        txn.state_mut().mappings.retain(|m| m.definition_id != *definition_id);
        Ok(format!("removed definition {definition_id}"))
    }
}

pub struct AddTable;

#[async_trait]
impl Handler for AddTable {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingAddTable { definition_id, table, column } = command else {
            unreachable!("dispatcher routed a mismatched command to AddTable");
        };
        if !txn.state().definitions.contains_key(definition_id) {
            return Err(ShardingError::DefinitionNotFound(*definition_id).into());
        }
        let mapping = ShardMapping {
            definition_id: *definition_id,
            table: table.clone(),
            column: column.clone(),
        };
        if txn.state().mappings.contains(&mapping) {
            return Err(ShardingError::InvalidSpecification(format!(
                "table \"{table}\" is already mapped under definition {definition_id}"
            ))
            .into());
        }
        txn.state_mut().mappings.push(mapping);
        Ok(format!("mapped table \"{table}\" under definition {definition_id}"))
    }
}

pub struct RemoveTable;

#[async_trait]
impl Handler for RemoveTable {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingRemoveTable { definition_id, table } = command else {
            unreachable!("dispatcher routed a mismatched command to RemoveTable");
        };
        let before = txn.state().mappings.len();
        txn.state_mut()
            .mappings
            .retain(|m| !(m.definition_id == *definition_id && &m.table == table));
        if txn.state().mappings.len() == before {
            return Err(ShardingError::NoShardingColumn(table.clone()).into());
        }
        Ok(format!("unmapped table \"{table}\" from definition {definition_id}"))
    }
}

pub struct AddShard;

#[async_trait]
impl Handler for AddShard {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingAddShard { definition_id, spec } = command else {
            unreachable!("dispatcher routed a mismatched command to AddShard");
        };
        if !txn.state().definitions.contains_key(definition_id) {
            return Err(ShardingError::DefinitionNotFound(*definition_id).into());
        }

        let mut parsed = Vec::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (group_id, lower_bound) = entry
                .split_once('/')
                .ok_or_else(|| ShardingError::InvalidSpecification(entry.to_string()))?;
            if !txn.state().groups.contains_key(group_id) {
                return Err(crate::error::GroupError::NotFound(group_id.to_string()).into());
            }
            parsed.push((group_id.to_string(), crate::model::ShardKey::parse(lower_bound)));
        }
        if parsed.is_empty() {
            return Err(ShardingError::InvalidSpecification(spec.clone()).into());
        }
        parsed.sort_by(|a, b| a.1.cmp(&b.1));

        let mut existing = txn.state().ranges_for_definition(*definition_id);
        existing.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));
        let mut all_bounds: Vec<_> = existing.iter().map(|r| r.lower_bound.clone()).collect();
        for (_, bound) in &parsed {
            if all_bounds.contains(bound) {
                return Err(ShardingError::OverlappingRanges.into());
            }
            all_bounds.push(bound.clone());
        }
        all_bounds.sort();

        let mut created = Vec::new();
        for (group_id, lower_bound) in parsed {
            let shard_id = txn.state_mut().alloc_shard_id();
            let sequence = all_bounds.iter().position(|b| b == &lower_bound).unwrap() as u32;
            txn.state_mut().shards.insert(
                shard_id,
                Shard {
                    id: shard_id,
                    definition_id: *definition_id,
                    group_id,
                    // New shards start disabled until explicitly enabled,
                    // giving the operator a window to provision data.
                    state: ShardState::Disabled,
                },
            );
            txn.state_mut().ranges.insert(
                shard_id,
                RangeSpec {
                    shard_id,
                    lower_bound,
                    sequence,
                },
            );
            created.push(shard_id);
        }
        Ok(format!(
            "added {} shard(s) to definition {definition_id}: {created:?}",
            created.len()
        ))
    }
}

pub struct RemoveShard;

#[async_trait]
impl Handler for RemoveShard {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingRemoveShard { shard_id } = command else {
            unreachable!("dispatcher routed a mismatched command to RemoveShard");
        };
        if txn.state_mut().shards.remove(shard_id).is_none() {
            return Err(ShardingError::ShardNotFound(*shard_id).into());
        }
        txn.state_mut().ranges.remove(shard_id);
        Ok(format!("removed shard {shard_id}"))
    }
}

fn global_master_address(
    txn: &Transaction,
    definition_id: crate::model::DefinitionId,
) -> Option<crate::model::Address> {
    let global_group = txn.state().definitions.get(&definition_id)?.global_group.clone()?;
    let master_id = txn.state().groups.get(&global_group)?.master?;
    let server = txn.state().servers.get(&master_id)?;
    super::support::parse_address(server).ok()
}

pub struct EnableShard;

#[async_trait]
impl Handler for EnableShard {
    async fn run(
        &self,
        txn: &mut Transaction,
        connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingEnableShard { shard_id } = command else {
            unreachable!("dispatcher routed a mismatched command to EnableShard");
        };
        let shard = txn
            .state()
            .shards
            .get(shard_id)
            .cloned()
            .ok_or(ShardingError::ShardNotFound(*shard_id))?;
        let target = global_master_address(txn, shard.definition_id);
        if let Some(master_id) = txn.state().groups.get(&shard.group_id).and_then(|g| g.master) {
            if let Some(server) = txn.state().servers.get(&master_id).cloned() {
                let address = super::support::parse_address(&server)?;
                let conn = connector.connect(&address, &server.user, &server.password).await?;
                conn.set_replication_source(target).await?;
            }
        }
        txn.state_mut().shards.get_mut(shard_id).unwrap().state = ShardState::Enabled;
        Ok(format!("enabled shard {shard_id}"))
    }
}

pub struct DisableShard;

#[async_trait]
impl Handler for DisableShard {
    async fn run(
        &self,
        txn: &mut Transaction,
        connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingDisableShard { shard_id } = command else {
            unreachable!("dispatcher routed a mismatched command to DisableShard");
        };
        let shard = txn
            .state()
            .shards
            .get(shard_id)
            .cloned()
            .ok_or(ShardingError::ShardNotFound(*shard_id))?;
        if let Some(master_id) = txn.state().groups.get(&shard.group_id).and_then(|g| g.master) {
            if let Some(server) = txn.state().servers.get(&master_id).cloned() {
                let address = super::support::parse_address(&server)?;
                let conn = connector.connect(&address, &server.user, &server.password).await?;
                conn.set_replication_source(None).await?;
            }
        }
        txn.state_mut().shards.get_mut(shard_id).unwrap().state = ShardState::Disabled;
        Ok(format!("disabled shard {shard_id}"))
    }
}

pub struct LookupServers;

#[async_trait]
impl Handler for LookupServers {
    async fn run(
        &self,
        txn: &mut Transaction,
        _connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ShardingLookupServers { table, value, hint } = command else {
            unreachable!("dispatcher routed a mismatched command to LookupServers");
        };
        let definition_id = txn
            .state()
            .mappings
            .iter()
            .find(|m| &m.table == table)
            .map(|m| m.definition_id)
            .ok_or_else(|| ShardingError::NoShardingColumn(table.clone()))?;

        let target_group = match hint {
            LookupHint::Global => txn
                .state()
                .definitions
                .get(&definition_id)
                .and_then(|d| d.global_group.clone())
                .ok_or_else(|| {
                    ShardingError::InvalidSpecification(format!(
                        "definition {definition_id} has no global group"
                    ))
                })?,
            LookupHint::Local => {
                let ranges = txn.state().ranges_for_definition(definition_id);
                let shard_id = ranges
                    .iter()
                    .filter(|r| r.lower_bound <= *value)
                    .max_by(|a, b| a.lower_bound.cmp(&b.lower_bound))
                    .map(|r| r.shard_id)
                    .ok_or_else(|| ShardingError::NoShardForKey(value.to_string()))?;
                txn.state()
                    .shards
                    .get(&shard_id)
                    .filter(|s| s.state == ShardState::Enabled)
                    .ok_or_else(|| ShardingError::NoShardForKey(value.to_string()))?
                    .group_id
                    .clone()
            }
        };

        let group = txn
            .state()
            .groups
            .get(&target_group)
            .cloned()
            .ok_or_else(|| crate::error::GroupError::NotFound(target_group.clone()))?;
        let servers: Vec<ServerInfo> = txn
            .state()
            .servers_in_group(&target_group)
            .into_iter()
            .map(|s| ServerInfo {
                id: s.id,
                address: s.address.clone(),
                is_master: group.master == Some(s.id),
                role: s.role,
                mode: s.mode,
            })
            .collect();
        serde_json::to_string(&servers).map_err(|e| CoreError::Usage(e.to_string()))
    }
}
