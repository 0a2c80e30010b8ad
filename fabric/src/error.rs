use thiserror::Error;

use crate::gateway::GatewayError;
use crate::model::ServerError;

/// Group-level validation and invariant errors (§7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("group \"{0}\" not found")]
    NotFound(String),

    #[error("group \"{0}\" already exists")]
    AlreadyExists(String),

    #[error("group \"{0}\" is not empty")]
    NotEmpty(String),

    #[error("group \"{0}\" has no master")]
    NoMaster(String),

    #[error("server \"{0}\" is not a member of group \"{1}\"")]
    ServerNotInGroup(String, String),

    #[error("no suitable promotion candidate in group \"{0}\"")]
    NoCandidate(String),

    #[error("cannot remove server \"{0}\": it is the master of its group")]
    CannotRemoveMaster(String),
}

/// Sharding-level validation and invariant errors (§7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShardingError {
    #[error("shard mapping definition {0} not found")]
    DefinitionNotFound(i64),

    #[error("shard {0} not found")]
    ShardNotFound(i64),

    #[error("no sharding column for table \"{0}\"")]
    NoShardingColumn(String),

    #[error("invalid shard specification: {0}")]
    InvalidSpecification(String),

    #[error("shard ranges overlap or are out of order")]
    OverlappingRanges,

    #[error("no shard owns key \"{0}\"")]
    NoShardForKey(String),
}

/// Top-level error type every handler and RPC boundary returns. Never
/// thrown across the RPC boundary as a native exception (§7): the command
/// layer always converts this into a status-log row with `success=false`.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("{0}")]
    Group(#[from] GroupError),

    #[error("{0}")]
    Sharding(#[from] ShardingError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("lock acquisition timed out")]
    LockTimeout,

    #[error("procedure aborted")]
    ExecutorAborted,

    #[error("usage error: {0}")]
    Usage(String),
}

impl CoreError {
    /// Human-readable diagnosis for the status log (§4.D step 5).
    pub fn diagnosis(&self) -> String {
        self.to_string()
    }
}
