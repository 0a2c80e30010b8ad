//! The failure detector (component G): polls each active group's master
//! and triggers a promotion procedure once it fails to respond for
//! `threshold` consecutive checks (§4.G).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::warn;

use crate::command::Command;
use crate::events::{Args, Dispatcher, EventId};
use crate::executor::Executor;
use crate::gateway::Gateway;
use crate::model::{Address, GroupId, GroupStatus, MySqlConnector};

struct GroupWatch {
    task: JoinHandle<()>,
}

/// Spawns one polling task per `Active` group found in the gateway.
/// `reconcile` adds watches for newly active groups and cancels watches for
/// groups that disappeared or went `Inactive` — this is what "registered
/// with the failure detector" (§4.F group.create/destroy) amounts to in
/// practice, without the handlers needing a direct dependency on this type.
pub struct FailureDetector {
    gateway: Arc<dyn Gateway>,
    dispatcher: Arc<Dispatcher>,
    executor: Arc<Executor>,
    connector: Arc<dyn MySqlConnector>,
    period: Duration,
    threshold: u32,
    watches: Mutex<HashMap<GroupId, GroupWatch>>,
}

impl FailureDetector {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        dispatcher: Arc<Dispatcher>,
        executor: Arc<Executor>,
        connector: Arc<dyn MySqlConnector>,
        period: Duration,
        threshold: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            dispatcher,
            executor,
            connector,
            period,
            threshold: threshold.max(1),
            watches: Mutex::new(HashMap::new()),
        })
    }

    /// Reconcile watched groups against current gateway state. Call this
    /// after every group.create/destroy and on a slow background tick to
    /// catch groups that changed status out of band.
    pub async fn reconcile(self: &Arc<Self>) {
        let active: Vec<GroupId> = {
            let txn = self.gateway.begin();
            txn.state()
                .groups
                .values()
                .filter(|g| g.status == GroupStatus::Active)
                .map(|g| g.id.clone())
                .collect()
        };
        let mut watches = self.watches.lock().await;
        watches.retain(|group_id, watch| {
            let keep = active.contains(group_id);
            if !keep {
                watch.task.abort();
            }
            keep
        });
        for group_id in active {
            if watches.contains_key(&group_id) {
                continue;
            }
            let task = self.spawn_watch(group_id.clone());
            watches.insert(group_id, GroupWatch { task });
        }
    }

    fn spawn_watch(self: &Arc<Self>, group_id: GroupId) -> JoinHandle<()> {
        let detector = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(detector.period);
            let strikes = AtomicU32::new(0);
            loop {
                ticker.tick().await;
                if detector.probe_healthy(&group_id).await {
                    strikes.store(0, Ordering::Relaxed);
                    continue;
                }
                let count = strikes.fetch_add(1, Ordering::Relaxed) + 1;
                if count >= detector.threshold {
                    warn!(group = %group_id, "failure threshold reached, triggering promotion");
                    let args = Args::new(Command::GroupPromote {
                        group_id: group_id.clone(),
                        candidate: None,
                    });
                    // The same event a user-triggered switchover uses, so
                    // the two compete for the group's lock (P6).
                    detector
                        .dispatcher
                        .trigger(&detector.executor, EventId::GroupPromote, args);
                    strikes.store(0, Ordering::Relaxed);
                }
            }
        })
    }

    async fn probe_healthy(&self, group_id: &str) -> bool {
        let master = {
            let txn = self.gateway.begin();
            txn.state()
                .groups
                .get(group_id)
                .and_then(|g| g.master)
                .and_then(|id| txn.state().servers.get(&id).cloned())
        };
        let Some(master) = master else {
            // No master to probe; nothing to fail over from yet.
            return true;
        };
        let Some(address) = Address::parse(&master.address) else {
            return false;
        };
        match self.connector.connect(&address, &master.user, &master.password).await {
            Ok(conn) => conn.binlog_position().await.is_ok(),
            Err(_) => false,
        }
    }
}
