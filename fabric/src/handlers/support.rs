//! Shared helpers used by more than one handler: address parsing, the
//! promotion candidate-selection algorithm, and catch-up polling.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::error::{CoreError, GroupError};
use crate::model::{Address, GroupId, MySqlConnector, Server, ServerId};

pub const CATCHUP_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const CATCHUP_TIMEOUT: Duration = Duration::from_secs(30);

pub fn parse_address(server: &Server) -> Result<Address, CoreError> {
    Address::parse(&server.address)
        .ok_or_else(|| CoreError::Usage(format!("invalid address \"{}\"", server.address)))
}

/// Smallest-lag candidate, ties broken by larger weight then smaller UUID
/// (§4.F step 1). Unreachable candidates are skipped rather than failing
/// the whole selection.
pub async fn select_candidate(
    connector: &dyn MySqlConnector,
    group_id: &GroupId,
    candidates: &[&Server],
    master_position: u64,
) -> Result<ServerId, CoreError> {
    let mut best: Option<(u64, u32, ServerId)> = None;
    for server in candidates {
        let address = match parse_address(server) {
            Ok(a) => a,
            Err(_) => continue,
        };
        let position = match connector.connect(&address, &server.user, &server.password).await {
            Ok(conn) => conn.binlog_position().await.unwrap_or(server.last_known_binlog_position),
            Err(_) => continue,
        };
        let lag = master_position.saturating_sub(position);
        let replace = match &best {
            None => true,
            Some((best_lag, best_weight, best_id)) => {
                lag < *best_lag
                    || (lag == *best_lag && server.weight > *best_weight)
                    || (lag == *best_lag && server.weight == *best_weight && server.id < *best_id)
            }
        };
        if replace {
            best = Some((lag, server.weight, server.id));
        }
    }
    best.map(|(_, _, id)| id)
        .ok_or_else(|| GroupError::NoCandidate(group_id.clone()).into())
}

/// Poll `candidate`'s binlog position until it reaches `target`, or time
/// out. Never a fixed sleep as the sole wait mechanism — the spec calls
/// this out explicitly as a required redesign from a naive port.
pub async fn wait_for_catchup(
    connector: &dyn MySqlConnector,
    candidate: &Server,
    target: u64,
) -> Result<(), CoreError> {
    let address = parse_address(candidate)?;
    let deadline = Instant::now() + CATCHUP_TIMEOUT;
    loop {
        let conn = connector.connect(&address, &candidate.user, &candidate.password).await?;
        let position = conn.binlog_position().await?;
        if position >= target {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(CoreError::Usage(format!(
                "candidate \"{}\" did not catch up to binlog position {target} before timeout",
                candidate.id
            )));
        }
        sleep(CATCHUP_POLL_INTERVAL).await;
    }
}

/// Current binlog position of a server, falling back to its last known
/// probe result if the connection attempt fails (§4.F step 2).
pub async fn probe_position(connector: &dyn MySqlConnector, server: &Server) -> u64 {
    let address = match parse_address(server) {
        Ok(a) => a,
        Err(_) => return server.last_known_binlog_position,
    };
    match connector.connect(&address, &server.user, &server.password).await {
        Ok(conn) => conn
            .binlog_position()
            .await
            .unwrap_or(server.last_known_binlog_position),
        Err(_) => server.last_known_binlog_position,
    }
}
