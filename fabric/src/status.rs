//! Procedure/job status types shared between the executor (which produces
//! them) and the persistence gateway (which stores them). Kept in their own
//! module so neither side depends on the other's internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-job outcome within a procedure's status log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Success,
    Error,
    Skipped,
}

/// A procedure's terminal state (§4.D). Procedures without a terminal row
/// are still running, or were interrupted by a crash (see `recover_on_start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalState {
    Complete,
    Error,
}

/// One append-only row in a procedure's status log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRow {
    pub timestamp: DateTime<Utc>,
    pub job_id: usize,
    pub state: JobState,
    pub success: bool,
    pub description: String,
    pub diagnosis: Option<String>,
}

/// Persisted record of one procedure, recovered across restarts per §4.D.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureRecord {
    pub id: Uuid,
    pub event: String,
    pub status: Vec<StatusRow>,
    pub terminal: Option<TerminalState>,
}

impl ProcedureRecord {
    pub fn new(id: Uuid, event: impl Into<String>) -> Self {
        Self {
            id,
            event: event.into(),
            status: Vec::new(),
            terminal: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}
