use thiserror::Error;

/// Errors raised by the persistence gateway (§4.A). `Transient` is the only
/// variant the executor retries automatically, once, at the job layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("transient database error: {0}")]
    Transient(String),

    #[error("fatal database error: {0}")]
    Fatal(String),
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_is_retryable() {
        assert!(GatewayError::Transient("timeout".into()).is_retryable());
        assert!(!GatewayError::Fatal("corrupt".into()).is_retryable());
        assert!(!GatewayError::NotFound("g1".into()).is_retryable());
    }
}
