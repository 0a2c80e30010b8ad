//! The group/server state model (component E).
//!
//! Entities here are plain records, not active objects: cross-references
//! between them (group -> server, group -> shard) are ids, resolved back
//! through the gateway, never stored as back-pointers (see DESIGN.md and
//! the "cyclic references" design note).

pub mod connector;
pub mod entities;
pub mod error;
pub mod fake;
pub mod key;

pub use connector::{Address, MySqlConnection, MySqlConnector};
pub use entities::{
    Group, GroupId, GroupStatus, RangeSpec, ReplicationRole, Server, ServerId, ServerMode, Shard,
    ShardId, ShardMapping, ShardMappingDefinition, ShardState, DefinitionId, MappingKind,
};
pub use error::ServerError;
pub use fake::FakeMySqlConnector;
pub use key::ShardKey;
