/// Event identifiers. One per command in the closed RPC namespace (§6),
/// plus nothing else — the detector triggers `GroupPromote`, the same
/// event a user switchover uses (§4.G, P6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventId {
    GroupCreate,
    GroupDestroy,
    GroupAdd,
    GroupRemove,
    GroupPromote,
    GroupDemote,
    GroupLookupGroups,
    GroupLookupServers,
    GroupDescription,
    ServerLookupUuid,
    ShardingCreateDefinition,
    ShardingRemoveDefinition,
    ShardingAddTable,
    ShardingRemoveTable,
    ShardingAddShard,
    ShardingRemoveShard,
    ShardingEnableShard,
    ShardingDisableShard,
    ShardingLookupServers,
}

impl EventId {
    /// The `<group_name>.<command_name>`-shaped name recorded against each
    /// procedure in the status log (§6).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventId::GroupCreate => "group.create",
            EventId::GroupDestroy => "group.destroy",
            EventId::GroupAdd => "group.add",
            EventId::GroupRemove => "group.remove",
            EventId::GroupPromote => "group.promote",
            EventId::GroupDemote => "group.demote",
            EventId::GroupLookupGroups => "group.lookup_groups",
            EventId::GroupLookupServers => "group.lookup_servers",
            EventId::GroupDescription => "group.description",
            EventId::ServerLookupUuid => "server.lookup_uuid",
            EventId::ShardingCreateDefinition => "sharding.create_definition",
            EventId::ShardingRemoveDefinition => "sharding.remove_definition",
            EventId::ShardingAddTable => "sharding.add_table",
            EventId::ShardingRemoveTable => "sharding.remove_table",
            EventId::ShardingAddShard => "sharding.add_shard",
            EventId::ShardingRemoveShard => "sharding.remove_shard",
            EventId::ShardingEnableShard => "sharding.enable_shard",
            EventId::ShardingDisableShard => "sharding.disable_shard",
            EventId::ShardingLookupServers => "sharding.lookup_servers",
        }
    }
}
