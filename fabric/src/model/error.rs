use thiserror::Error;

use super::entities::ServerId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerError {
    #[error("server \"{0}\" not found")]
    NotFound(ServerId),

    #[error("server at \"{0}\" is unreachable")]
    Unreachable(String),

    #[error("server version \"{found}\" is below the configured minimum \"{minimum}\"")]
    VersionMismatch { found: String, minimum: String },

    #[error("account \"{0}\" lacks sufficient privileges")]
    AuthInsufficient(String),

    #[error("server at \"{0}\" is already registered with uuid {1}")]
    AlreadyRegistered(String, ServerId),
}
