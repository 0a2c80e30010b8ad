//! The persistence gateway (component A): atomic, transactional reads and
//! writes of fleet state, plus the shared connection pool.

pub mod error;
pub mod memory;
pub mod pool;
pub mod retention;

pub use error::GatewayError;
pub use memory::{commit_retrying, FleetState, Gateway, MemoryGateway, Transaction};
pub use pool::ConnectionPool;
