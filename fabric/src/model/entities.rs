use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::key::ShardKey;

pub type ServerId = Uuid;
pub type GroupId = String;
pub type DefinitionId = i64;
pub type ShardId = i64;

/// A server's place in its group's replication topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationRole {
    Primary,
    Secondary,
    Spare,
    Faulty,
}

/// A server's write availability, independent of its replication role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMode {
    Offline,
    ReadOnly,
    ReadWrite,
}

/// A server record (§3). Identity is the UUID discovered from the live
/// instance on first contact, never operator-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub address: String,
    pub user: String,
    pub password: String,
    pub role: ReplicationRole,
    pub mode: ServerMode,
    pub weight: u32,
    pub last_seen: DateTime<Utc>,
    pub group_id: Option<GroupId>,
    /// UUID of the server this one replicates from, if any. Not the same as
    /// group membership: a shard group's master replicates from the global
    /// group's master (I3), which lives in a different group entirely.
    pub replication_source: Option<ServerId>,
    /// Binlog position from this server's most recent successful
    /// replication-status probe. Promotion falls back to this when the
    /// current master is unreachable (§4.F step 2).
    pub last_known_binlog_position: u64,
}

impl Server {
    pub fn new(id: ServerId, address: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
            user: user.into(),
            password: password.into(),
            role: ReplicationRole::Spare,
            mode: ServerMode::ReadWrite,
            weight: 1,
            last_seen: Utc::now(),
            group_id: None,
            replication_source: None,
            last_known_binlog_position: 0,
        }
    }
}

/// Whether a group currently participates in fleet operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupStatus {
    Active,
    Inactive,
}

/// A replication group (§3). At most one master (I2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub description: Option<String>,
    pub master: Option<ServerId>,
    pub status: GroupStatus,
}

impl Group {
    pub fn new(id: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: id.into(),
            description,
            master: None,
            status: GroupStatus::Active,
        }
    }
}

/// RANGE or HASH sharding scheme. Only RANGE is fully specified by §4.F;
/// HASH is carried as a variant so `ShardMappingDefinition::kind` round-trips,
/// but has no routing implementation (see Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingKind {
    Range,
    Hash,
}

/// A shard-mapping definition (§3): the parent of a set of shards and the
/// (table, column) pairs that route through them, optionally fanning out
/// writes from a global group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardMappingDefinition {
    pub id: DefinitionId,
    pub kind: MappingKind,
    pub global_group: Option<GroupId>,
}

/// Associates one (table, column) pair with a definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShardMapping {
    pub definition_id: DefinitionId,
    pub table: String,
    pub column: String,
}

/// ENABLED shards replicate the global group's writes; DISABLED shards are
/// detached from the topology (§4.F enable_shard/disable_shard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardState {
    Enabled,
    Disabled,
}

/// A shard (§3): one range within a definition, owned by one shard group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shard {
    pub id: ShardId,
    pub definition_id: DefinitionId,
    pub group_id: GroupId,
    pub state: ShardState,
}

/// The lower bound that opens a shard's key range (§3, I4). A shard owns
/// keys `k` with `lower_bound <= k < next_shard.lower_bound`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSpec {
    pub shard_id: ShardId,
    pub lower_bound: ShardKey,
    /// Sequence within the definition; strictly increasing with
    /// `lower_bound` (§6 "shard ranges carry a monotonically increasing
    /// sequence within a definition").
    pub sequence: u32,
}
