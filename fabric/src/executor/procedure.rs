use uuid::Uuid;

use crate::status::{ProcedureRecord, StatusRow, TerminalState};

/// Returned immediately by `trigger`/`submit`; never blocks (§4.D
/// "Synchronous vs asynchronous return").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureHandle {
    pub id: Uuid,
}

/// What a synchronous caller gets back: the full status log plus whether
/// the procedure finished `COMPLETE`.
#[derive(Debug, Clone)]
pub struct ProcedureOutcome {
    pub id: Uuid,
    pub status: Vec<StatusRow>,
    pub complete: bool,
}

impl From<ProcedureRecord> for ProcedureOutcome {
    fn from(record: ProcedureRecord) -> Self {
        Self {
            id: record.id,
            complete: record.terminal == Some(TerminalState::Complete),
            status: record.status,
        }
    }
}
