//! The closed RPC command namespace (§6). A `Command` is the normalized,
//! already-typed form of an incoming `<group_name>.<command_name>(args...)`
//! call — parsing the wire request into this shape is the RPC transport's
//! job and is out of scope here.

use serde::{Deserialize, Serialize};

use crate::events::EventId;
use crate::locks::LockPath;
use crate::model::{GroupId, MappingKind, ServerId, ShardKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupHint {
    Global,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    GroupCreate {
        group_id: GroupId,
        description: Option<String>,
    },
    GroupDestroy {
        group_id: GroupId,
        force: bool,
    },
    GroupAdd {
        group_id: GroupId,
        address: String,
        user: String,
        password: String,
    },
    GroupRemove {
        group_id: GroupId,
        server_id: ServerId,
    },
    GroupPromote {
        group_id: GroupId,
        candidate: Option<ServerId>,
    },
    GroupDemote {
        group_id: GroupId,
    },
    GroupLookupGroups {
        group_id: Option<GroupId>,
    },
    GroupLookupServers {
        group_id: GroupId,
        server_id: Option<ServerId>,
    },
    GroupDescription {
        group_id: GroupId,
        description: Option<String>,
    },
    ServerLookupUuid {
        address: String,
        user: String,
        password: String,
    },
    ShardingCreateDefinition {
        kind: MappingKind,
        global_group: Option<GroupId>,
    },
    ShardingRemoveDefinition {
        definition_id: i64,
    },
    ShardingAddTable {
        definition_id: i64,
        table: String,
        column: String,
    },
    ShardingRemoveTable {
        definition_id: i64,
        table: String,
    },
    ShardingAddShard {
        definition_id: i64,
        /// Comma-separated `GROUPID/lower_bound,...` specification (§4.F).
        spec: String,
    },
    ShardingRemoveShard {
        shard_id: i64,
    },
    ShardingEnableShard {
        shard_id: i64,
    },
    ShardingDisableShard {
        shard_id: i64,
    },
    ShardingLookupServers {
        table: String,
        value: ShardKey,
        hint: LookupHint,
    },
}

impl Command {
    pub fn event_id(&self) -> EventId {
        match self {
            Command::GroupCreate { .. } => EventId::GroupCreate,
            Command::GroupDestroy { .. } => EventId::GroupDestroy,
            Command::GroupAdd { .. } => EventId::GroupAdd,
            Command::GroupRemove { .. } => EventId::GroupRemove,
            Command::GroupPromote { .. } => EventId::GroupPromote,
            Command::GroupDemote { .. } => EventId::GroupDemote,
            Command::GroupLookupGroups { .. } => EventId::GroupLookupGroups,
            Command::GroupLookupServers { .. } => EventId::GroupLookupServers,
            Command::GroupDescription { .. } => EventId::GroupDescription,
            Command::ServerLookupUuid { .. } => EventId::ServerLookupUuid,
            Command::ShardingCreateDefinition { .. } => EventId::ShardingCreateDefinition,
            Command::ShardingRemoveDefinition { .. } => EventId::ShardingRemoveDefinition,
            Command::ShardingAddTable { .. } => EventId::ShardingAddTable,
            Command::ShardingRemoveTable { .. } => EventId::ShardingRemoveTable,
            Command::ShardingAddShard { .. } => EventId::ShardingAddShard,
            Command::ShardingRemoveShard { .. } => EventId::ShardingRemoveShard,
            Command::ShardingEnableShard { .. } => EventId::ShardingEnableShard,
            Command::ShardingDisableShard { .. } => EventId::ShardingDisableShard,
            Command::ShardingLookupServers { .. } => EventId::ShardingLookupServers,
        }
    }

    /// Declared lock set for this command (§4.B). Computed upfront, before
    /// any handler runs, so the dispatcher can acquire every lock a
    /// procedure might need before submitting its jobs.
    pub fn lock_paths(&self) -> Vec<LockPath> {
        match self {
            Command::GroupCreate { group_id, .. }
            | Command::GroupDestroy { group_id, .. }
            | Command::GroupAdd { group_id, .. }
            | Command::GroupRemove { group_id, .. }
            | Command::GroupDemote { group_id }
            | Command::GroupDescription { group_id, .. } => {
                vec![LockPath::Group(group_id.clone())]
            }
            // Promotion may re-point shard-group replication topology
            // (§4.F step 4), so it also takes the global lock.
            Command::GroupPromote { group_id, .. } => {
                vec![LockPath::Group(group_id.clone()), LockPath::Global]
            }
            Command::GroupLookupGroups { group_id } => group_id
                .iter()
                .map(|id| LockPath::Group(id.clone()))
                .collect(),
            Command::GroupLookupServers { group_id, .. } => {
                vec![LockPath::Group(group_id.clone())]
            }
            Command::ServerLookupUuid { .. } => vec![],
            Command::ShardingCreateDefinition { .. } | Command::ShardingRemoveDefinition { .. } => {
                vec![LockPath::Global]
            }
            Command::ShardingAddTable { .. } | Command::ShardingRemoveTable { .. } => {
                vec![LockPath::Global]
            }
            Command::ShardingAddShard { .. } => vec![LockPath::Global],
            Command::ShardingRemoveShard { shard_id }
            | Command::ShardingEnableShard { shard_id }
            | Command::ShardingDisableShard { shard_id } => {
                vec![LockPath::Global, LockPath::Shard(*shard_id)]
            }
            Command::ShardingLookupServers { .. } => vec![],
        }
    }
}
