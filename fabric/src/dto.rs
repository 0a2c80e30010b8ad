//! Response payloads returned by read-only commands and by procedures that
//! report back more than a plain description. Handlers serialize these to
//! JSON and return the string as their job's status-log description; the
//! RPC adapter is responsible for handing it back to the caller verbatim
//! (§6, §9 Design Note 9.5 — shaping stays out of the dispatcher/executor).

use serde::{Deserialize, Serialize};

use crate::model::{GroupId, GroupStatus, ReplicationRole, ServerId, ServerMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: GroupId,
    pub description: Option<String>,
    pub master: Option<ServerId>,
    pub status: GroupStatus,
}

/// `(uuid, address, is_master)` per §4.F "Each returned server record".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: ServerId,
    pub address: String,
    pub is_master: bool,
    pub role: ReplicationRole,
    pub mode: ServerMode,
}
