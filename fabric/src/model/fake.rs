//! In-memory double for the MySQL driver, standing in for the
//! explicitly out-of-scope "MySQL driver and SQL text" (spec.md §1).
//! Every integration test in this repository drives the coordination
//! kernel against this instead of a real `mysqld`.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::connector::{Address, MySqlConnection, MySqlConnector};
use super::entities::ServerId;
use super::error::ServerError;

struct FakeServer {
    uuid: ServerId,
    version: String,
    root: bool,
    reachable: bool,
    binlog_position: AtomicU64,
    replication_source: Mutex<Option<Address>>,
}

/// Shared fleet simulator. Clone to hand a handle to multiple components;
/// all clones see the same underlying servers.
#[derive(Clone, Default)]
pub struct FakeMySqlConnector {
    servers: Arc<Mutex<HashMap<Address, FakeServer>>>,
}

impl FakeMySqlConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a simulated server reachable at `address`.
    pub fn add_server(&self, address: Address, version: &str) -> ServerId {
        let uuid = Uuid::new_v4();
        self.servers.lock().insert(
            address,
            FakeServer {
                uuid,
                version: version.to_string(),
                root: true,
                reachable: true,
                binlog_position: AtomicU64::new(0),
                replication_source: Mutex::new(None),
            },
        );
        uuid
    }

    pub fn set_reachable(&self, address: &Address, reachable: bool) {
        if let Some(server) = self.servers.lock().get_mut(address) {
            server.reachable = reachable;
        }
    }

    /// Simulate a write committed on `address`: advance its binlog and
    /// propagate it one hop down the replication chain from every server
    /// currently configured to replicate from it, the way native MySQL
    /// asynchronous replication would within one control-loop tick.
    pub fn write(&self, address: &Address) -> Result<(), ServerError> {
        let servers = self.servers.lock();
        let server = servers
            .get(address)
            .ok_or_else(|| ServerError::Unreachable(address.to_string()))?;
        if !server.reachable {
            return Err(ServerError::Unreachable(address.to_string()));
        }
        server.binlog_position.fetch_add(1, Ordering::SeqCst);
        let new_position = server.binlog_position.load(Ordering::SeqCst);
        drop(servers);
        self.propagate(address, new_position);
        Ok(())
    }

    fn propagate(&self, from: &Address, position: u64) {
        let servers = self.servers.lock();
        for (addr, server) in servers.iter() {
            if addr == from || !server.reachable {
                continue;
            }
            let source = server.replication_source.lock().clone();
            if source.as_ref() == Some(from) {
                server.binlog_position.store(position, Ordering::SeqCst);
            }
        }
    }

    pub fn binlog_position_of(&self, address: &Address) -> Option<u64> {
        self.servers
            .lock()
            .get(address)
            .map(|s| s.binlog_position.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl MySqlConnector for FakeMySqlConnector {
    async fn discover_uuid(
        &self,
        address: &Address,
        _user: &str,
        _password: &str,
    ) -> Result<ServerId, ServerError> {
        let servers = self.servers.lock();
        let server = servers
            .get(address)
            .ok_or_else(|| ServerError::Unreachable(address.to_string()))?;
        if !server.reachable {
            return Err(ServerError::Unreachable(address.to_string()));
        }
        Ok(server.uuid)
    }

    async fn connect(
        &self,
        address: &Address,
        _user: &str,
        _password: &str,
    ) -> Result<Box<dyn MySqlConnection>, ServerError> {
        let reachable = self
            .servers
            .lock()
            .get(address)
            .map(|s| s.reachable)
            .ok_or_else(|| ServerError::Unreachable(address.to_string()))?;
        if !reachable {
            return Err(ServerError::Unreachable(address.to_string()));
        }
        Ok(Box::new(FakeConnection {
            address: address.clone(),
            servers: self.servers.clone(),
        }))
    }
}

struct FakeConnection {
    address: Address,
    servers: Arc<Mutex<HashMap<Address, FakeServer>>>,
}

impl FakeConnection {
    fn with_server<T>(&self, f: impl FnOnce(&FakeServer) -> Result<T, ServerError>) -> Result<T, ServerError> {
        let servers = self.servers.lock();
        let server = servers
            .get(&self.address)
            .ok_or_else(|| ServerError::Unreachable(self.address.to_string()))?;
        if !server.reachable {
            return Err(ServerError::Unreachable(self.address.to_string()));
        }
        f(server)
    }
}

#[async_trait]
impl MySqlConnection for FakeConnection {
    async fn server_version(&self) -> Result<String, ServerError> {
        self.with_server(|s| Ok(s.version.clone()))
    }

    async fn has_root_privileges(&self) -> Result<bool, ServerError> {
        self.with_server(|s| Ok(s.root))
    }

    async fn exec_stmt(&self, _stmt: &str) -> Result<(), ServerError> {
        self.with_server(|_| Ok(()))
    }

    async fn set_replication_source(&self, source: Option<Address>) -> Result<(), ServerError> {
        self.with_server(|s| {
            *s.replication_source.lock() = source;
            Ok(())
        })
    }

    async fn replication_source(&self) -> Result<Option<Address>, ServerError> {
        self.with_server(|s| Ok(s.replication_source.lock().clone()))
    }

    async fn binlog_position(&self) -> Result<u64, ServerError> {
        self.with_server(|s| Ok(s.binlog_position.load(Ordering::SeqCst)))
    }

    async fn disconnect(&self) -> Result<(), ServerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discovers_uuid() {
        let fake = FakeMySqlConnector::new();
        let addr = Address::parse("127.0.0.1:3306").unwrap();
        let uuid = fake.add_server(addr.clone(), "5.7.30");
        let discovered = fake.discover_uuid(&addr, "root", "").await.unwrap();
        assert_eq!(uuid, discovered);
    }

    #[tokio::test]
    async fn replication_propagates_one_hop() {
        let fake = FakeMySqlConnector::new();
        let master = Address::parse("127.0.0.1:3306").unwrap();
        let replica = Address::parse("127.0.0.1:3307").unwrap();
        fake.add_server(master.clone(), "5.7.30");
        fake.add_server(replica.clone(), "5.7.30");

        let conn = fake.connect(&replica, "root", "").await.unwrap();
        conn.set_replication_source(Some(master.clone()))
            .await
            .unwrap();

        fake.write(&master).unwrap();
        assert_eq!(fake.binlog_position_of(&master), Some(1));
        assert_eq!(fake.binlog_position_of(&replica), Some(1));
    }

    #[tokio::test]
    async fn unreachable_master_rejects_write() {
        let fake = FakeMySqlConnector::new();
        let master = Address::parse("127.0.0.1:3306").unwrap();
        fake.add_server(master.clone(), "5.7.30");
        fake.set_reachable(&master, false);
        assert!(fake.write(&master).is_err());
    }
}
