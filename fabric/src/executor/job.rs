use chrono::Utc;

use crate::status::{JobState, StatusRow};

pub fn success_row(job_id: usize, description: String) -> StatusRow {
    StatusRow {
        timestamp: Utc::now(),
        job_id,
        state: JobState::Success,
        success: true,
        description,
        diagnosis: None,
    }
}

pub fn error_row(job_id: usize, diagnosis: String) -> StatusRow {
    StatusRow {
        timestamp: Utc::now(),
        job_id,
        state: JobState::Error,
        success: false,
        description: "job failed".to_string(),
        diagnosis: Some(diagnosis),
    }
}

pub fn skipped_row(job_id: usize) -> StatusRow {
    StatusRow {
        timestamp: Utc::now(),
        job_id,
        state: JobState::Skipped,
        success: false,
        description: "skipped: an earlier job in this procedure failed".to_string(),
        diagnosis: None,
    }
}

/// Emitted by `recover_on_start` for procedures left non-terminal by an
/// unclean shutdown (§4.D "crash recovery").
pub fn recovery_row(job_id: usize) -> StatusRow {
    StatusRow {
        timestamp: Utc::now(),
        job_id,
        state: JobState::Error,
        success: false,
        description: "job failed".to_string(),
        diagnosis: Some("executor restarted".to_string()),
    }
}
