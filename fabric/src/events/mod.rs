//! The event dispatcher (component C): a registry mapping an event
//! identifier to an ordered list of handlers. `trigger` is non-blocking —
//! it builds the job pipeline and hands it to the executor, returning a
//! procedure handle immediately.

mod event_id;
mod handler;

pub use event_id::EventId;
pub use handler::{Args, Handler};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::executor::{Executor, ProcedureHandle};

/// Maps an event to its ordered handler list, one job per handler at
/// trigger time. Registration order is part of the contract (§4.C) and
/// must be preserved; this is why handlers are appended to a `Vec`, not
/// stored in a structure that could reorder them.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<EventId, Vec<Arc<dyn Handler>>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler against an event. Called once at process
    /// initialization (see `handlers::register_all`) — never as a module
    /// load side effect (Design Note 9.1).
    pub fn on_event(&self, event: EventId, handler: Arc<dyn Handler>) {
        self.handlers.write().entry(event).or_default().push(handler);
    }

    /// Enqueue one job per registered handler, in registration order, and
    /// return the procedure handle immediately.
    pub fn trigger(&self, executor: &Executor, event: EventId, args: Args) -> ProcedureHandle {
        let handlers = self
            .handlers
            .read()
            .get(&event)
            .cloned()
            .unwrap_or_default();
        executor.submit(event, handlers, args)
    }

    pub fn handler_count(&self, event: EventId) -> usize {
        self.handlers.read().get(&event).map(Vec::len).unwrap_or(0)
    }
}
