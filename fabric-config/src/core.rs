use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::{credentials::Credentials, error::Error, general::General};

/// `fabric.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: General,
}

impl Config {
    /// Validate settings that can't be expressed through serde defaults
    /// alone. Mirrors the reference stack's `Config::check`, except ours
    /// returns an error instead of only warning: an empty worker pool or a
    /// zero detector threshold violate explicit contract minimums.
    pub fn check(&self) -> Result<(), Error> {
        if self.general.executor.workers == 0 {
            return Err(Error::EmptyWorkerPool);
        }
        if self.general.detector.threshold == 0 {
            return Err(Error::ZeroDetectorThreshold);
        }
        Ok(())
    }
}

/// Combined operational configuration and server credentials, the unit the
/// rest of the system loads and hot-swaps as one snapshot.
#[derive(Debug, Clone)]
pub struct ConfigAndCredentials {
    pub config: Config,
    pub credentials: Credentials,
    pub config_path: PathBuf,
    pub credentials_path: PathBuf,
}

impl Default for ConfigAndCredentials {
    fn default() -> Self {
        Self {
            config: Config::default(),
            credentials: Credentials::default(),
            config_path: PathBuf::from("fabric.toml"),
            credentials_path: PathBuf::from("credentials.toml"),
        }
    }
}

impl ConfigAndCredentials {
    pub fn load(config_path: &PathBuf, credentials_path: &PathBuf) -> Result<Self, Error> {
        let config: Config = if let Ok(raw) = read_to_string(config_path) {
            let config = toml::from_str(&raw)
                .map_err(|e| Error::Parse(config_path.clone(), Box::new(e)))?;
            info!("loaded \"{}\"", config_path.display());
            config
        } else {
            warn!(
                "\"{}\" doesn't exist, loading defaults instead",
                config_path.display()
            );
            Config::default()
        };

        let credentials: Credentials = if let Ok(raw) = read_to_string(credentials_path) {
            let credentials = toml::from_str(&raw)
                .map_err(|e| Error::Parse(credentials_path.clone(), Box::new(e)))?;
            info!("loaded \"{}\"", credentials_path.display());
            credentials
        } else {
            warn!(
                "\"{}\" doesn't exist, loading defaults instead",
                credentials_path.display()
            );
            Credentials::default()
        };

        config.check()?;

        Ok(Self {
            config,
            credentials,
            config_path: config_path.clone(),
            credentials_path: credentials_path.clone(),
        })
    }
}
