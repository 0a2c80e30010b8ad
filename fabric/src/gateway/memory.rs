use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::error::GatewayError;
use super::pool::ConnectionPool;
use super::retention::evict_if_needed;
use crate::model::{
    DefinitionId, Group, GroupId, RangeSpec, Server, ServerId, Shard, ShardId, ShardMapping,
    ShardMappingDefinition,
};
use crate::status::ProcedureRecord;

/// The entirety of persisted fleet state (§3 entities plus the procedure
/// status log). Cloned at `begin()` to give each transaction an isolated
/// read/write snapshot — the in-memory analogue of the MVCC read-view the
/// spec describes for job execution (§4.D step 2).
#[derive(Debug, Clone, Default)]
pub struct FleetState {
    pub groups: HashMap<GroupId, Group>,
    pub servers: HashMap<ServerId, Server>,
    pub definitions: HashMap<DefinitionId, ShardMappingDefinition>,
    pub mappings: Vec<ShardMapping>,
    pub shards: HashMap<ShardId, Shard>,
    pub ranges: HashMap<ShardId, RangeSpec>,
    pub procedures: HashMap<Uuid, ProcedureRecord>,
    pub procedure_order: Vec<Uuid>,
    next_definition_id: DefinitionId,
    next_shard_id: ShardId,
}

impl FleetState {
    pub fn alloc_definition_id(&mut self) -> DefinitionId {
        self.next_definition_id += 1;
        self.next_definition_id
    }

    pub fn alloc_shard_id(&mut self) -> ShardId {
        self.next_shard_id += 1;
        self.next_shard_id
    }

    /// Ranges belonging to one definition, in ascending `lower_bound` order
    /// (I4: totally ordered, non-overlapping).
    pub fn ranges_for_definition(&self, definition_id: DefinitionId) -> Vec<&RangeSpec> {
        let mut ranges: Vec<&RangeSpec> = self
            .shards
            .values()
            .filter(|s| s.definition_id == definition_id)
            .filter_map(|s| self.ranges.get(&s.id))
            .collect();
        ranges.sort_by(|a, b| a.sequence.cmp(&b.sequence));
        ranges
    }

    pub fn shards_for_definition(&self, definition_id: DefinitionId) -> Vec<&Shard> {
        self.shards
            .values()
            .filter(|s| s.definition_id == definition_id)
            .collect()
    }

    pub fn servers_in_group(&self, group_id: &str) -> Vec<&Server> {
        self.servers
            .values()
            .filter(|s| s.group_id.as_deref() == Some(group_id))
            .collect()
    }
}

/// Trait seam for the backing store. Only `MemoryGateway` ships in this
/// repository; a production deployment would add a durable implementation
/// behind the same interface (see DESIGN.md).
pub trait Gateway: Send + Sync {
    fn begin(&self) -> Transaction;
    fn pool(&self) -> &ConnectionPool;
    fn max_retained_procedures(&self) -> usize;

    /// Point lookup of a procedure record without opening a full
    /// transaction. Used by the executor to answer `wait()` and by RPC
    /// status-log queries.
    fn procedure(&self, id: Uuid) -> Option<ProcedureRecord>;
}

/// Shared state plus the generation counter transactions validate against
/// at commit time (§4.A: "serializable transactions ... optimistic
/// concurrency is acceptable, retry on conflict"). Every successful commit
/// bumps the generation; a transaction whose base generation no longer
/// matches lost the race and must retry against a fresh snapshot rather
/// than overwrite the winner's write.
struct Versioned {
    generation: u64,
    state: FleetState,
}

/// Transactional read/write handle over one snapshot of `FleetState`.
/// Dropping without calling `commit` is a rollback: the working copy is
/// simply discarded and the shared state is left untouched.
pub struct Transaction {
    shared: Arc<RwLock<Versioned>>,
    working: FleetState,
    base_generation: u64,
    committed: bool,
}

impl Transaction {
    fn new(shared: Arc<RwLock<Versioned>>) -> Self {
        let guard = shared.read();
        let working = guard.state.clone();
        let base_generation = guard.generation;
        drop(guard);
        Self {
            shared,
            working,
            base_generation,
            committed: false,
        }
    }

    pub fn state(&self) -> &FleetState {
        &self.working
    }

    pub fn state_mut(&mut self) -> &mut FleetState {
        &mut self.working
    }

    /// Commit the working snapshot as the new shared state.
    pub fn commit(self) -> Result<(), GatewayError> {
        self.commit_with_retention(usize::MAX)
    }

    /// Commit, enforcing the configured retention cap on completed
    /// procedures (see DESIGN.md retention decision). Fails with
    /// `GatewayError::Transient` if another transaction committed since this
    /// one's snapshot was taken — the caller is expected to retry against a
    /// fresh `begin()` rather than treat this as fatal.
    pub fn commit_with_retention(mut self, max_retained: usize) -> Result<(), GatewayError> {
        evict_if_needed(&mut self.working, max_retained);
        let mut guard = self.shared.write();
        if guard.generation != self.base_generation {
            return Err(GatewayError::Transient(format!(
                "snapshot generation {} is stale (current generation {})",
                self.base_generation, guard.generation
            )));
        }
        guard.state = std::mem::take(&mut self.working);
        guard.generation += 1;
        self.committed = true;
        Ok(())
    }

    /// Explicit rollback, for symmetry with `commit`; equivalent to simply
    /// dropping the transaction.
    pub fn rollback(self) {}
}

/// Retry a transactional mutation against fresh snapshots until it commits
/// cleanly, or give up after a bounded number of attempts. This is the
/// optimistic-concurrency fallback itself: callers that only need to mutate
/// and don't care about a return value other than success reach for this
/// instead of hand-rolling a retry loop around `begin`/`commit_with_retention`.
pub fn commit_retrying(gateway: &dyn Gateway, max_retained: usize, mut mutate: impl FnMut(&mut Transaction)) {
    const MAX_ATTEMPTS: u32 = 16;
    for attempt in 0..MAX_ATTEMPTS {
        let mut txn = gateway.begin();
        mutate(&mut txn);
        match txn.commit_with_retention(max_retained) {
            Ok(()) => return,
            Err(_) if attempt + 1 < MAX_ATTEMPTS => continue,
            Err(e) => {
                warn!(error = %e, "gave up retrying a gateway commit after sustained conflicts");
                return;
            }
        }
    }
}

/// Default, in-memory implementation of the persistence gateway.
pub struct MemoryGateway {
    state: Arc<RwLock<Versioned>>,
    pool: ConnectionPool,
    max_retained_procedures: usize,
}

impl MemoryGateway {
    pub fn new(max_retained_procedures: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(Versioned {
                generation: 0,
                state: FleetState::default(),
            })),
            pool: ConnectionPool::new(),
            max_retained_procedures,
        }
    }

    /// Snapshot the current state without opening a transaction. Used by
    /// read-only RPC commands (`lookup_groups`, `lookup_servers`) that don't
    /// need a job to run inside the executor.
    pub fn snapshot(&self) -> FleetState {
        self.state.read().state.clone()
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(500)
    }
}

impl Gateway for MemoryGateway {
    fn begin(&self) -> Transaction {
        Transaction::new(self.state.clone())
    }

    fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn max_retained_procedures(&self) -> usize {
        self.max_retained_procedures
    }

    fn procedure(&self, id: Uuid) -> Option<ProcedureRecord> {
        self.state.read().state.procedures.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, GroupStatus};

    #[test]
    fn rollback_discards_working_copy() {
        let gateway = MemoryGateway::new(500);
        let mut txn = gateway.begin();
        txn.state_mut().groups.insert(
            "G1".into(),
            Group {
                id: "G1".into(),
                description: None,
                master: None,
                status: GroupStatus::Active,
            },
        );
        txn.rollback();
        assert!(gateway.snapshot().groups.is_empty());
    }

    #[test]
    fn commit_persists_changes() {
        let gateway = MemoryGateway::new(500);
        let mut txn = gateway.begin();
        txn.state_mut().groups.insert(
            "G1".into(),
            Group {
                id: "G1".into(),
                description: None,
                master: None,
                status: GroupStatus::Active,
            },
        );
        txn.commit().unwrap();
        assert!(gateway.snapshot().groups.contains_key("G1"));
    }

    #[test]
    fn two_transactions_do_not_see_each_others_uncommitted_writes() {
        let gateway = MemoryGateway::new(500);
        let mut txn_a = gateway.begin();
        let txn_b = gateway.begin();
        txn_a.state_mut().groups.insert(
            "G1".into(),
            Group {
                id: "G1".into(),
                description: None,
                master: None,
                status: GroupStatus::Active,
            },
        );
        txn_a.commit().unwrap();
        assert!(!txn_b.state().groups.contains_key("G1"));
    }

    #[test]
    fn a_stale_commit_is_rejected_instead_of_clobbering_the_winner() {
        let gateway = MemoryGateway::new(500);
        let mut txn_a = gateway.begin();
        let mut txn_b = gateway.begin();

        txn_a.state_mut().groups.insert("A".into(), Group::new("A", None));
        txn_a.commit().unwrap();

        txn_b.state_mut().groups.insert("B".into(), Group::new("B", None));
        let err = txn_b.commit().unwrap_err();
        assert!(err.is_retryable());

        // A's write survives; B's was rejected rather than silently lost.
        let snapshot = gateway.snapshot();
        assert!(snapshot.groups.contains_key("A"));
        assert!(!snapshot.groups.contains_key("B"));
    }

    #[test]
    fn commit_retrying_reapplies_the_mutation_until_it_lands() {
        let gateway = MemoryGateway::new(500);
        let mut calls = 0;
        commit_retrying(&gateway, 500, |txn| {
            calls += 1;
            if calls == 1 {
                // Simulate a concurrent writer committing behind this
                // attempt's back, forcing the first commit to go stale.
                let mut interloper = gateway.begin();
                interloper.state_mut().groups.insert("A".into(), Group::new("A", None));
                interloper.commit().unwrap();
            }
            txn.state_mut().groups.insert("B".into(), Group::new("B", None));
        });

        let snapshot = gateway.snapshot();
        assert!(snapshot.groups.contains_key("A"));
        assert!(snapshot.groups.contains_key("B"));
        assert_eq!(calls, 2);
    }
}
