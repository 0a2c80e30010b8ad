use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error reading \"{0}\": {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("TOML parse error in \"{0}\": {1}")]
    Parse(PathBuf, #[source] Box<toml::de::Error>),

    #[error("worker pool size must be at least 1")]
    EmptyWorkerPool,

    #[error("failure detector threshold must be at least 1")]
    ZeroDetectorThreshold,

    #[error("minimum server version \"{0}\" is not a valid version string")]
    InvalidVersion(String),

    #[error("{0:#?}")]
    Multiple(Vec<Error>),
}
