//! The RPC adapter layer (§6): shapes a parsed `Command` plus a loosely
//! typed `synchronous` argument into the dispatcher/executor call and back
//! into the `(procedure_uuid, status_log, complete)` / `procedure_uuid`
//! response pair. Deserializing wire bytes into `Command` is the actual
//! transport's job and stays out of this crate (§1 scope cut).

use uuid::Uuid;

use crate::context::FabricContext;
use crate::error::CoreError;
use crate::events::Args;
use crate::status::StatusRow;

/// The loosely typed `synchronous` argument as it would arrive over the
/// wire, before normalization.
#[derive(Debug, Clone)]
pub enum RawSynchronous {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for RawSynchronous {
    fn from(value: bool) -> Self {
        RawSynchronous::Bool(value)
    }
}

/// Accepts case-insensitive `"true"`/`"false"`, `1`/`0`, and native bools;
/// anything else is a usage error (§9 Design Note 9.5). Defined here, not
/// in the dispatcher or executor, which never see the raw wire form.
pub fn normalize_synchronous(raw: &RawSynchronous) -> Result<bool, CoreError> {
    match raw {
        RawSynchronous::Bool(b) => Ok(*b),
        RawSynchronous::Int(0) => Ok(false),
        RawSynchronous::Int(1) => Ok(true),
        RawSynchronous::Int(other) => Err(CoreError::Usage(format!(
            "synchronous must be 0 or 1, got {other}"
        ))),
        RawSynchronous::Text(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(CoreError::Usage(format!(
                "synchronous must be true/false/1/0, got \"{other}\""
            ))),
        },
    }
}

#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Async {
        procedure_uuid: Uuid,
    },
    Sync {
        procedure_uuid: Uuid,
        status_log: Vec<StatusRow>,
        complete: bool,
    },
}

/// Submit `command` through the dispatcher and either return immediately
/// with its procedure id (`synchronous = false`) or wait for it to reach a
/// terminal state and return the full status log (`synchronous = true`).
pub async fn dispatch(
    ctx: &FabricContext,
    command: crate::command::Command,
    synchronous: RawSynchronous,
) -> Result<CommandOutcome, CoreError> {
    let synchronous = normalize_synchronous(&synchronous)?;
    let event = command.event_id();
    let args = Args::new(command);
    let handle = ctx.dispatcher.trigger(&ctx.executor, event, args);

    if !synchronous {
        return Ok(CommandOutcome::Async {
            procedure_uuid: handle.id,
        });
    }

    let outcome = ctx
        .executor
        .wait(handle.id)
        .await
        .ok_or(CoreError::ExecutorAborted)?;
    Ok(CommandOutcome::Sync {
        procedure_uuid: outcome.id,
        status_log: outcome.status,
        complete: outcome.complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_case_insensitive_text_bools() {
        assert!(normalize_synchronous(&RawSynchronous::Text("TRUE".into())).unwrap());
        assert!(!normalize_synchronous(&RawSynchronous::Text("False".into())).unwrap());
    }

    #[test]
    fn accepts_integer_flags() {
        assert!(normalize_synchronous(&RawSynchronous::Int(1)).unwrap());
        assert!(!normalize_synchronous(&RawSynchronous::Int(0)).unwrap());
    }

    #[test]
    fn rejects_unrecognized_text() {
        assert!(normalize_synchronous(&RawSynchronous::Text("maybe".into())).is_err());
    }

    #[test]
    fn rejects_out_of_range_integers() {
        assert!(normalize_synchronous(&RawSynchronous::Int(2)).is_err());
    }
}
