use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::ServerId;
use super::error::ServerError;

/// A `host:port` pair. Parsing and formatting only; the actual socket I/O
/// lives behind `MySqlConnector`, which is out of this crate's scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn parse(raw: &str) -> Option<Self> {
        let (host, port) = raw.rsplit_once(':')?;
        let port = port.parse().ok()?;
        Some(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A live connection to one MySQL instance. The spec places the driver and
/// its SQL text out of scope; this trait is the seam a real driver (e.g.
/// `mysql_async`) would implement. `FakeMySqlConnection` is the in-memory
/// test double used throughout this repository's test suite.
#[async_trait]
pub trait MySqlConnection: Send + Sync {
    async fn server_version(&self) -> Result<String, ServerError>;
    async fn has_root_privileges(&self) -> Result<bool, ServerError>;
    async fn exec_stmt(&self, stmt: &str) -> Result<(), ServerError>;
    /// Point this server's replication source at `source`, or detach it
    /// from replication entirely when `None`.
    async fn set_replication_source(&self, source: Option<Address>) -> Result<(), ServerError>;
    async fn replication_source(&self) -> Result<Option<Address>, ServerError>;
    /// Monotonically increasing replication position. Handlers poll this to
    /// wait for catch-up instead of sleeping a fixed duration (REDESIGN
    /// FLAGS in spec.md §9).
    async fn binlog_position(&self) -> Result<u64, ServerError>;
    async fn disconnect(&self) -> Result<(), ServerError>;
}

/// Establishes connections and performs first-contact discovery. Exactly
/// one instance is shared across the fleet (see `FabricContext`).
#[async_trait]
pub trait MySqlConnector: Send + Sync {
    /// Open a short-lived connection, read the server's UUID, close it.
    /// Used to reject duplicate registrations (§4.E).
    async fn discover_uuid(
        &self,
        address: &Address,
        user: &str,
        password: &str,
    ) -> Result<ServerId, ServerError>;

    async fn connect(
        &self,
        address: &Address,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn MySqlConnection>, ServerError>;
}
