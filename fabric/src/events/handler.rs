use async_trait::async_trait;

use crate::command::Command;
use crate::error::CoreError;
use crate::gateway::{ConnectionPool, Transaction};
use crate::locks::LockPath;
use crate::model::MySqlConnector;

/// A job's execution parameters: the command plus the lock set the
/// dispatcher resolved for it.
#[derive(Debug, Clone)]
pub struct Args {
    pub command: Command,
    pub lock_paths: Vec<LockPath>,
}

impl Args {
    pub fn new(command: Command) -> Self {
        let lock_paths = command.lock_paths();
        Self { command, lock_paths }
    }
}

/// One step of a procedure's pipeline (§4.C, §4.F). Each registered
/// handler becomes one job; the executor opens a transaction, calls `run`,
/// and commits or rolls back based on the result (§4.D).
///
/// `Ok(description)` becomes a `SUCCESS` status row; `Err(e)` becomes an
/// `ERROR` row carrying `e.diagnosis()` and marks every later job in the
/// procedure `SKIPPED`.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn run(
        &self,
        txn: &mut Transaction,
        connector: &dyn MySqlConnector,
        pool: &ConnectionPool,
        command: &Command,
    ) -> Result<String, CoreError>;
}
