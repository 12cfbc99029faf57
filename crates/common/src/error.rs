//! Common error types for StockFlow

use thiserror::Error;

/// Common error type used across StockFlow crates
#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected before any side effect took place
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No correlated response arrived within the deadline
    #[error("Timed out after {0:?} waiting for correlated response")]
    Timeout(std::time::Duration),

    /// The responding service reported an explicit failure
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// The requested start date is not a trading day in the fetched series
    #[error("Start date {0} not found in price series")]
    StartDateNotFound(chrono::NaiveDate),

    /// A pending slot already exists for this correlation id
    #[error("Duplicate correlation id: {0}")]
    DuplicateCorrelationId(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create an upstream failure carrying the responder's reason verbatim
    pub fn upstream(reason: impl Into<String>) -> Self {
        Self::UpstreamFailure(reason.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors that terminate a request flow with a FAILED result
    /// rather than indicating a caller bug.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::UpstreamFailure(_) | Self::StartDateNotFound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_verbatim() {
        let err = Error::upstream("RATE_LIMITED");
        assert_eq!(err.to_string(), "Upstream failure: RATE_LIMITED");
    }

    #[test]
    fn test_terminal_failure_classification() {
        assert!(Error::upstream("x").is_terminal_failure());
        assert!(Error::Timeout(std::time::Duration::from_secs(30)).is_terminal_failure());
        assert!(!Error::invalid_request("bad").is_terminal_failure());
    }
}
