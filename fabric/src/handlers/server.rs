use async_trait::async_trait;

use crate::command::Command;
use crate::error::CoreError;
use crate::events::Handler;
use crate::gateway::{ConnectionPool, Transaction};
use crate::model::{Address, MySqlConnector};

pub struct ServerLookupUuid;

#[async_trait]
impl Handler for ServerLookupUuid {
    async fn run(
        &self,
        _txn: &mut Transaction,
        connector: &dyn MySqlConnector,
        _pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError> {
        let Command::ServerLookupUuid { address, user, password } = command else {
            unreachable!("dispatcher routed a mismatched command to ServerLookupUuid");
        };
        let addr = Address::parse(address)
            .ok_or_else(|| CoreError::Usage(format!("invalid address \"{address}\"")))?;
        let uuid = connector.discover_uuid(&addr, user, password).await?;
        Ok(uuid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, MemoryGateway};
    use crate::model::FakeMySqlConnector;

    #[tokio::test]
    async fn returns_the_discovered_uuid_as_text() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let addr = Address::parse("127.0.0.1:3306").unwrap();
        let uuid = connector.add_server(addr.clone(), "5.7.30");

        let mut txn = gateway.begin();
        let result = ServerLookupUuid
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::ServerLookupUuid {
                    address: addr.to_string(),
                    user: "root".into(),
                    password: "".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(result, uuid.to_string());
    }

    #[tokio::test]
    async fn rejects_malformed_address() {
        let gateway = MemoryGateway::new(500);
        let connector = FakeMySqlConnector::new();
        let mut txn = gateway.begin();
        let err = ServerLookupUuid
            .run(
                &mut txn,
                &connector,
                gateway.pool(),
                &Command::ServerLookupUuid {
                    address: "not-an-address".into(),
                    user: "root".into(),
                    password: "".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Usage(_)));
    }
}
