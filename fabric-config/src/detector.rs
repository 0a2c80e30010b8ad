use serde::{Deserialize, Serialize};

/// Failure detector timing, per registered group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Detector {
    /// How often to probe a group's master.
    #[serde(default = "Detector::default_period_ms")]
    pub period_ms: u64,

    /// Consecutive failed probes required before a failover is triggered.
    #[serde(default = "Detector::default_threshold")]
    pub threshold: u32,
}

impl Detector {
    fn default_period_ms() -> u64 {
        2_000
    }

    fn default_threshold() -> u32 {
        3
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            period_ms: Self::default_period_ms(),
            threshold: Self::default_threshold(),
        }
    }
}
