//! The scheduling kernel (component D): a bounded worker pool that turns a
//! dispatcher's job pipeline into gateway transactions, one per handler, and
//! persists the resulting status log as it goes (§4.D).

mod job;
mod procedure;

pub use procedure::{ProcedureHandle, ProcedureOutcome};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{watch, Semaphore};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::events::{Args, EventId, Handler};
use crate::gateway::{commit_retrying, Gateway};
use crate::locks::LockManager;
use crate::model::MySqlConnector;
use crate::status::{ProcedureRecord, StatusRow, TerminalState};

/// Bound on how many times a single job's handler is re-run against a fresh
/// snapshot after a commit conflict (§4.A optimistic concurrency retry).
const MAX_COMMIT_ATTEMPTS: u32 = 16;

/// Runs procedures. Cheap to clone: every field is an `Arc`, so spawned
/// tasks hold their own handle rather than borrowing `self`.
#[derive(Clone)]
pub struct Executor {
    gateway: Arc<dyn Gateway>,
    connector: Arc<dyn MySqlConnector>,
    locks: Arc<LockManager>,
    semaphore: Arc<Semaphore>,
    watches: Arc<DashMap<Uuid, watch::Sender<bool>>>,
    abort_flags: Arc<DashMap<Uuid, Arc<AtomicBool>>>,
    max_retained: usize,
}

impl Executor {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        connector: Arc<dyn MySqlConnector>,
        locks: Arc<LockManager>,
        workers: usize,
    ) -> Self {
        let max_retained = gateway.max_retained_procedures();
        Self {
            gateway,
            connector,
            locks,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            watches: Arc::new(DashMap::new()),
            abort_flags: Arc::new(DashMap::new()),
            max_retained,
        }
    }

    /// Mark every procedure left non-terminal by an unclean shutdown as
    /// `ERROR`, diagnosis "executor restarted" (§4.D crash recovery). Call
    /// once, before accepting RPC traffic.
    pub fn recover_on_start(&self) {
        let mut recovered = 0;
        commit_retrying(self.gateway.as_ref(), self.max_retained, |txn| {
            let stuck: Vec<Uuid> = txn
                .state()
                .procedure_order
                .iter()
                .filter(|id| {
                    txn.state()
                        .procedures
                        .get(*id)
                        .map(|p| !p.is_terminal())
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            recovered = stuck.len();
            for id in &stuck {
                if let Some(record) = txn.state_mut().procedures.get_mut(id) {
                    let job_id = record.status.len();
                    record.status.push(job::recovery_row(job_id));
                    record.terminal = Some(TerminalState::Error);
                }
            }
        });
        if recovered > 0 {
            warn!(count = recovered, "recovered stuck procedures on startup");
        }
    }

    /// Enqueue one job per handler and return immediately. The caller that
    /// needs a synchronous result awaits `wait(handle.id)` separately —
    /// `submit` itself never blocks on job execution (§4.D).
    pub fn submit(&self, event: EventId, handlers: Vec<Arc<dyn Handler>>, args: Args) -> ProcedureHandle {
        let id = Uuid::new_v4();
        commit_retrying(self.gateway.as_ref(), self.max_retained, |txn| {
            txn.state_mut()
                .procedures
                .insert(id, ProcedureRecord::new(id, event.as_str()));
            txn.state_mut().procedure_order.push(id);
        });

        let (tx, _rx) = watch::channel(false);
        self.watches.insert(id, tx);
        self.abort_flags.insert(id, Arc::new(AtomicBool::new(false)));

        let executor = self.clone();
        tokio::spawn(async move {
            executor.run_procedure(id, handlers, args).await;
        });

        ProcedureHandle { id }
    }

    /// Cooperative abort: the running job finishes, but every job after it
    /// is marked `SKIPPED` instead of starting (§4.D abort/deadline).
    pub fn abort(&self, id: Uuid) -> bool {
        match self.abort_flags.get(&id) {
            Some(flag) => {
                flag.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Block until the procedure reaches a terminal state, then return its
    /// outcome. Returns `None` if `id` is unknown (never submitted, or its
    /// record already aged out of retention).
    pub async fn wait(&self, id: Uuid) -> Option<ProcedureOutcome> {
        if let Some(entry) = self.watches.get(&id) {
            let mut rx = entry.subscribe();
            drop(entry);
            while !*rx.borrow() {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
        self.gateway.procedure(id).map(ProcedureOutcome::from)
    }

    async fn run_procedure(&self, id: Uuid, handlers: Vec<Arc<dyn Handler>>, args: Args) {
        let _permit = self.semaphore.acquire().await;
        // Lock acquisition is a synchronous, potentially blocking call; the
        // multi-threaded runtime tolerates this for the lock hold times this
        // kernel expects (single in-memory state mutation per job).
        let _locks = self.locks.acquire(&args.lock_paths);
        let abort_flag = self
            .abort_flags
            .get(&id)
            .map(|f| f.clone())
            .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));

        let mut terminal = TerminalState::Complete;
        for (job_id, handler) in handlers.iter().enumerate() {
            if abort_flag.load(Ordering::Relaxed) {
                self.append_rows(id, (job_id..handlers.len()).map(job::skipped_row).collect());
                terminal = TerminalState::Error;
                break;
            }

            match self.run_job(handler.as_ref(), &args.command).await {
                Ok(description) => {
                    self.append_row(id, job::success_row(job_id, description));
                }
                Err(e) => {
                    self.append_row(id, job::error_row(job_id, e.diagnosis()));
                    if job_id + 1 < handlers.len() {
                        self.append_rows(
                            id,
                            ((job_id + 1)..handlers.len()).map(job::skipped_row).collect(),
                        );
                    }
                    terminal = TerminalState::Error;
                    break;
                }
            }
        }

        self.finalize(id, terminal);
        self.abort_flags.remove(&id);
        if let Some((_, tx)) = self.watches.remove(&id) {
            let _ = tx.send(true);
        }
        info!(procedure = %id, ?terminal, "procedure finished");
    }

    /// Run one handler against a fresh transaction and commit it, re-running
    /// the handler against a new snapshot if the commit loses a race with a
    /// concurrent procedure touching disjoint lock paths (§4.A). The handler
    /// itself decides the job's outcome; only a generation conflict on
    /// commit triggers a retry here.
    async fn run_job(&self, handler: &dyn Handler, command: &crate::command::Command) -> Result<String, CoreError> {
        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let mut txn = self.gateway.begin();
            let description = handler
                .run(&mut txn, self.connector.as_ref(), self.gateway.pool(), command)
                .await?;
            match txn.commit_with_retention(self.max_retained) {
                Ok(()) => return Ok(description),
                Err(e) if e.is_retryable() && attempt + 1 < MAX_COMMIT_ATTEMPTS => continue,
                Err(e) => return Err(e.into()),
            }
        }
        unreachable!("loop above always returns before exhausting MAX_COMMIT_ATTEMPTS")
    }

    fn append_row(&self, id: Uuid, row: StatusRow) {
        self.append_rows(id, vec![row]);
    }

    fn append_rows(&self, id: Uuid, rows: Vec<StatusRow>) {
        commit_retrying(self.gateway.as_ref(), self.max_retained, |txn| {
            if let Some(record) = txn.state_mut().procedures.get_mut(&id) {
                record.status.extend(rows.clone());
            }
        });
    }

    fn finalize(&self, id: Uuid, terminal: TerminalState) {
        commit_retrying(self.gateway.as_ref(), self.max_retained, |txn| {
            if let Some(record) = txn.state_mut().procedures.get_mut(&id) {
                record.terminal = Some(terminal);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::model::FakeMySqlConnector;
    use async_trait::async_trait;

    struct AlwaysOk;

    #[async_trait]
    impl Handler for AlwaysOk {
        async fn run(
            &self,
            _txn: &mut crate::gateway::Transaction,
            _connector: &dyn MySqlConnector,
            _pool: &crate::gateway::ConnectionPool,
            _command: &crate::command::Command,
        ) -> Result<String, crate::error::CoreError> {
            Ok("done".to_string())
        }
    }

    struct AlwaysErr;

    #[async_trait]
    impl Handler for AlwaysErr {
        async fn run(
            &self,
            _txn: &mut crate::gateway::Transaction,
            _connector: &dyn MySqlConnector,
            _pool: &crate::gateway::ConnectionPool,
            _command: &crate::command::Command,
        ) -> Result<String, crate::error::CoreError> {
            Err(crate::error::CoreError::Usage("boom".to_string()))
        }
    }

    fn test_executor() -> Executor {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new(500));
        let connector: Arc<dyn MySqlConnector> = Arc::new(FakeMySqlConnector::new());
        Executor::new(gateway, connector, Arc::new(LockManager::new()), 4)
    }

    fn noop_args() -> Args {
        Args::new(crate::command::Command::GroupLookupGroups { group_id: None })
    }

    #[tokio::test]
    async fn successful_procedure_completes() {
        let executor = test_executor();
        let handle = executor.submit(EventId::GroupCreate, vec![Arc::new(AlwaysOk)], noop_args());
        let outcome = executor.wait(handle.id).await.unwrap();
        assert!(outcome.complete);
        assert_eq!(outcome.status.len(), 1);
    }

    #[tokio::test]
    async fn failing_job_skips_the_rest() {
        let executor = test_executor();
        let handlers: Vec<Arc<dyn Handler>> = vec![Arc::new(AlwaysErr), Arc::new(AlwaysOk)];
        let handle = executor.submit(EventId::GroupCreate, handlers, noop_args());
        let outcome = executor.wait(handle.id).await.unwrap();
        assert!(!outcome.complete);
        assert_eq!(outcome.status.len(), 2);
        assert!(!outcome.status[0].success);
        assert_eq!(
            outcome.status[1].description,
            "skipped: an earlier job in this procedure failed"
        );
    }

    #[tokio::test]
    async fn abort_skips_jobs_not_yet_started() {
        let executor = test_executor();
        let handlers: Vec<Arc<dyn Handler>> = vec![Arc::new(AlwaysOk)];
        let handle = executor.submit(EventId::GroupCreate, handlers, noop_args());
        executor.abort(handle.id);
        let outcome = executor.wait(handle.id).await.unwrap();
        assert!(!outcome.complete);
    }

    #[tokio::test]
    async fn recover_on_start_marks_stuck_procedures_error() {
        let gateway = Arc::new(MemoryGateway::new(500));
        let id = Uuid::new_v4();
        let mut txn = gateway.begin();
        txn.state_mut()
            .procedures
            .insert(id, ProcedureRecord::new(id, "group.promote"));
        txn.state_mut().procedure_order.push(id);
        txn.commit().unwrap();

        let connector: Arc<dyn MySqlConnector> = Arc::new(FakeMySqlConnector::new());
        let executor = Executor::new(gateway.clone(), connector, Arc::new(LockManager::new()), 4);
        executor.recover_on_start();

        let record = gateway.procedure(id).unwrap();
        assert_eq!(record.terminal, Some(TerminalState::Error));
        assert_eq!(record.status.last().unwrap().diagnosis.as_deref(), Some("executor restarted"));
    }

}
