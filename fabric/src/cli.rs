use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::de::Error as _;
use std::fs::read_to_string;
use thiserror::Error;
use tracing::info;

use fabric_config::{Config, Credentials};

/// Fabric manages a fleet of MySQL replication groups: HA failover and
/// range-based sharding behind a closed RPC command namespace.
#[derive(Parser, Debug)]
#[command(name = "fabric", version)]
pub struct Cli {
    /// Path to the configuration file. Default: "fabric.toml"
    #[arg(short, long, default_value = "fabric.toml")]
    pub config: PathBuf,

    /// Path to the server credentials file. Default: "credentials.toml"
    #[arg(short = 'r', long, default_value = "credentials.toml")]
    pub credentials: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the coordination kernel.
    Run,

    /// Check configuration and credentials files for errors.
    Configcheck,
}

#[derive(Debug, Error)]
pub enum ConfigCheckError {
    #[error("I/O error on `{0}`: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("TOML parse error in `{0}`: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("{0:#?}")]
    Multiple(Vec<ConfigCheckError>),
}

/// Confirm the configuration and credentials files parse and satisfy the
/// contract minimums (`Config::check`).
pub fn config_check(config_path: &PathBuf, credentials_path: &PathBuf) -> Result<(), ConfigCheckError> {
    let mut errors: Vec<ConfigCheckError> = Vec::new();

    match read_to_string(config_path) {
        Ok(s) => match toml::from_str::<Config>(&s) {
            Ok(config) => {
                if let Err(e) = config.check() {
                    errors.push(ConfigCheckError::Parse(
                        config_path.clone(),
                        toml::de::Error::custom(e.to_string()),
                    ));
                }
            }
            Err(e) => errors.push(ConfigCheckError::Parse(config_path.clone(), e)),
        },
        Err(e) => errors.push(ConfigCheckError::Io(config_path.clone(), e)),
    }

    match read_to_string(credentials_path) {
        Ok(s) => {
            if let Err(e) = toml::from_str::<Credentials>(&s) {
                errors.push(ConfigCheckError::Parse(credentials_path.clone(), e));
            }
        }
        Err(e) => errors.push(ConfigCheckError::Io(credentials_path.clone(), e)),
    }

    match errors.len() {
        0 => {
            info!("configuration and credentials are valid");
            Ok(())
        }
        1 => Err(errors.into_iter().next().unwrap()),
        _ => Err(ConfigCheckError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_files_are_reported_as_io_errors() {
        let result = config_check(
            &PathBuf::from("/nonexistent/fabric.toml"),
            &PathBuf::from("/nonexistent/credentials.toml"),
        );
        assert!(matches!(result, Err(ConfigCheckError::Multiple(_))));
    }

    #[test]
    fn valid_files_pass() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(config_file, "[general]").unwrap();
        let mut credentials_file = NamedTempFile::new().unwrap();
        writeln!(credentials_file, "servers = []").unwrap();
        let result = config_check(&config_file.path().to_path_buf(), &credentials_file.path().to_path_buf());
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_a_config_file_that_fails_the_contract_minimums() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(config_file, "[general.executor]\nworkers = 0").unwrap();
        let mut credentials_file = NamedTempFile::new().unwrap();
        writeln!(credentials_file, "servers = []").unwrap();
        let result = config_check(&config_file.path().to_path_buf(), &credentials_file.path().to_path_buf());
        assert!(matches!(result, Err(ConfigCheckError::Parse(_, _))));
    }

    #[test]
    fn reports_both_files_failing_at_once() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(config_file, "not valid toml = [").unwrap();
        let mut credentials_file = NamedTempFile::new().unwrap();
        writeln!(credentials_file, "also not valid toml = [").unwrap();
        let result = config_check(&config_file.path().to_path_buf(), &credentials_file.path().to_path_buf());
        assert!(matches!(result, Err(ConfigCheckError::Multiple(_))));
    }
}
