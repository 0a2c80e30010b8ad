use serde::{Deserialize, Serialize};

/// Executor worker-pool sizing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Executor {
    /// Number of concurrent procedure workers. The spec guarantees a minimum
    /// of one; zero is rejected at config-check time.
    #[serde(default = "Executor::default_workers")]
    pub workers: usize,

    /// Default procedure deadline, in seconds. `None` means no deadline.
    #[serde(default)]
    pub default_deadline_secs: Option<u64>,
}

impl Executor {
    fn default_workers() -> usize {
        4
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            workers: Self::default_workers(),
            default_deadline_secs: None,
        }
    }
}
