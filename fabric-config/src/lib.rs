//! Fleet configuration.
//!
//! A thin, serde-backed configuration crate in the spirit of the pooler's own
//! `config` crate: one TOML file for operational settings, one for server
//! credentials, loaded into a hot-swappable global singleton.

pub mod core;
pub mod credentials;
pub mod detector;
pub mod error;
pub mod executor;
pub mod general;
pub mod version;

pub use core::{Config, ConfigAndCredentials};
pub use credentials::{Credentials, ServerCredentials};
pub use detector::Detector;
pub use error::Error;
pub use executor::Executor;
pub use general::General;
pub use version::MinServerVersion;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Arc;

static CONFIG: Lazy<ArcSwap<ConfigAndCredentials>> =
    Lazy::new(|| ArcSwap::from_pointee(ConfigAndCredentials::default()));

/// Current configuration snapshot.
pub fn config() -> Arc<ConfigAndCredentials> {
    CONFIG.load().clone()
}

/// Load configuration and credentials files from disk, validate, and install
/// them as the new global snapshot.
pub fn load(config_path: &PathBuf, credentials_path: &PathBuf) -> Result<ConfigAndCredentials, Error> {
    let loaded = ConfigAndCredentials::load(config_path, credentials_path)?;
    set(loaded)
}

/// Install a configuration snapshot, replacing the current one atomically.
pub fn set(config: ConfigAndCredentials) -> Result<ConfigAndCredentials, Error> {
    config.config.check()?;
    CONFIG.store(Arc::new(config.clone()));
    Ok(config)
}

#[cfg(test)]
pub fn load_test() {
    let config = ConfigAndCredentials::default();
    set(config).unwrap();
}
