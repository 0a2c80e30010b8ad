//! The single explicit context object threading the kernel's components
//! together (Design Note 9.3): no process-wide singletons for the
//! coordination kernel itself, only for the configuration snapshot.

use std::sync::Arc;
use std::time::Duration;

use crate::detector::FailureDetector;
use crate::events::Dispatcher;
use crate::executor::Executor;
use crate::gateway::{Gateway, MemoryGateway};
use crate::handlers;
use crate::locks::LockManager;
use crate::model::MySqlConnector;

pub struct FabricContext {
    pub gateway: Arc<dyn Gateway>,
    pub locks: Arc<LockManager>,
    pub dispatcher: Arc<Dispatcher>,
    pub executor: Arc<Executor>,
    pub detector: Arc<FailureDetector>,
}

impl FabricContext {
    /// Build a context from the current global configuration snapshot and a
    /// connector implementation. Registers every handler and recovers any
    /// procedures left stuck by an unclean shutdown before returning.
    pub fn new(connector: Arc<dyn MySqlConnector>) -> Self {
        let settings = fabric_config::config();
        let gateway: Arc<dyn Gateway> =
            Arc::new(MemoryGateway::new(settings.config.general.max_retained_procedures));
        Self::with_gateway(gateway, connector)
    }

    /// Build a context over a caller-supplied gateway — used by tests that
    /// need a handle to the gateway alongside the context.
    pub fn with_gateway(gateway: Arc<dyn Gateway>, connector: Arc<dyn MySqlConnector>) -> Self {
        let settings = fabric_config::config();
        let locks = Arc::new(LockManager::new());
        let executor = Arc::new(Executor::new(
            gateway.clone(),
            connector.clone(),
            locks.clone(),
            settings.config.general.executor.workers,
        ));
        executor.recover_on_start();

        let dispatcher = Arc::new(Dispatcher::new());
        handlers::register_all(&dispatcher);

        let detector = FailureDetector::new(
            gateway.clone(),
            dispatcher.clone(),
            executor.clone(),
            connector,
            Duration::from_millis(settings.config.general.detector.period_ms),
            settings.config.general.detector.threshold,
        );

        Self {
            gateway,
            locks,
            dispatcher,
            executor,
            detector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::model::FakeMySqlConnector;

    #[tokio::test]
    async fn wiring_registers_every_handler_and_runs_a_command_end_to_end() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new(500));
        let connector: Arc<dyn MySqlConnector> = Arc::new(FakeMySqlConnector::new());
        let ctx = FabricContext::with_gateway(gateway, connector);

        assert!(ctx.dispatcher.handler_count(crate::events::EventId::GroupCreate) > 0);

        let handle = ctx.dispatcher.trigger(
            &ctx.executor,
            crate::events::EventId::GroupCreate,
            crate::events::Args::new(Command::GroupCreate { group_id: "G1".into(), description: None }),
        );
        let outcome = ctx.executor.wait(handle.id).await.unwrap();
        assert!(outcome.complete);
        assert!(ctx.gateway.begin().state().groups.contains_key("G1"));
    }

    #[tokio::test]
    async fn recovers_stuck_procedures_left_by_an_earlier_context() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new(500));
        {
            let mut txn = gateway.begin();
            let id = uuid::Uuid::new_v4();
            txn.state_mut()
                .procedures
                .insert(id, crate::status::ProcedureRecord::new(id, "group.create"));
            txn.state_mut().procedure_order.push(id);
            txn.commit().unwrap();
        }
        let connector: Arc<dyn MySqlConnector> = Arc::new(FakeMySqlConnector::new());
        let _ctx = FabricContext::with_gateway(gateway.clone(), connector);
        let stuck = gateway
            .begin()
            .state()
            .procedures
            .values()
            .next()
            .unwrap()
            .terminal;
        assert_eq!(stuck, Some(crate::status::TerminalState::Error));
    }
}
