use serde::{Deserialize, Serialize};

use crate::{version::MinServerVersion, Detector, Executor};

/// Top-level operational settings: everything besides server credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    /// Backing store connection string for the persistence gateway.
    /// Out of scope for the core contract beyond being an opaque value
    /// handed to whichever `Gateway` implementation is wired up.
    #[serde(default = "General::default_store_dsn")]
    pub store_dsn: String,

    /// Address the RPC surface binds to. The transport itself is out of
    /// scope; this is only carried through as configuration.
    #[serde(default = "General::default_rpc_bind")]
    pub rpc_bind_address: String,

    #[serde(default)]
    pub executor: Executor,

    #[serde(default)]
    pub detector: Detector,

    #[serde(default)]
    pub min_server_version: MinServerVersion,

    /// Maximum number of completed procedures retained in the status log
    /// per gateway instance (see DESIGN.md retention decision).
    #[serde(default = "General::default_max_procedures")]
    pub max_retained_procedures: usize,
}

impl General {
    fn default_store_dsn() -> String {
        "memory://fabric".to_string()
    }

    fn default_rpc_bind() -> String {
        "127.0.0.1:32274".to_string()
    }

    fn default_max_procedures() -> usize {
        500
    }
}

impl Default for General {
    fn default() -> Self {
        Self {
            store_dsn: Self::default_store_dsn(),
            rpc_bind_address: Self::default_rpc_bind(),
            executor: Executor::default(),
            detector: Detector::default(),
            min_server_version: MinServerVersion::default(),
            max_retained_procedures: Self::default_max_procedures(),
        }
    }
}
