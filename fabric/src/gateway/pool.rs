use parking_lot::Mutex;
use std::collections::HashMap;

use crate::model::{MySqlConnection, ServerId};

/// Bounded multiset of live connections per server UUID (§4.A). Boxed
/// trait objects since the concrete connection type is whatever
/// `MySqlConnector::connect` handed back.
#[derive(Default)]
pub struct ConnectionPool {
    inner: Mutex<HashMap<ServerId, Vec<Box<dyn MySqlConnection>>>>,
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkin(&self, server: ServerId, connection: Box<dyn MySqlConnection>) {
        self.inner.lock().entry(server).or_default().push(connection);
    }

    pub fn checkout(&self, server: ServerId) -> Option<Box<dyn MySqlConnection>> {
        self.inner.lock().get_mut(&server).and_then(|v| v.pop())
    }

    /// Empty a server's pool entry. Must be called whenever a server is
    /// removed from a group (§4.A contract).
    pub fn purge_connections(&self, server: ServerId) {
        self.inner.lock().remove(&server);
    }

    pub fn live_count(&self, server: ServerId) -> usize {
        self.inner
            .lock()
            .get(&server)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServerError;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct Dummy;

    #[async_trait]
    impl MySqlConnection for Dummy {
        async fn server_version(&self) -> Result<String, ServerError> {
            Ok("5.7.0".into())
        }
        async fn has_root_privileges(&self) -> Result<bool, ServerError> {
            Ok(true)
        }
        async fn exec_stmt(&self, _stmt: &str) -> Result<(), ServerError> {
            Ok(())
        }
        async fn set_replication_source(
            &self,
            _source: Option<crate::model::Address>,
        ) -> Result<(), ServerError> {
            Ok(())
        }
        async fn replication_source(&self) -> Result<Option<crate::model::Address>, ServerError> {
            Ok(None)
        }
        async fn binlog_position(&self) -> Result<u64, ServerError> {
            Ok(0)
        }
        async fn disconnect(&self) -> Result<(), ServerError> {
            Ok(())
        }
    }

    #[test]
    fn purge_empties_entry() {
        let pool = ConnectionPool::new();
        let id = Uuid::new_v4();
        pool.checkin(id, Box::new(Dummy));
        assert_eq!(pool.live_count(id), 1);
        pool.purge_connections(id);
        assert_eq!(pool.live_count(id), 0);
    }
}
