//! Error types for Sonarr API operations.
//!
//! Transport and protocol failures are classified here so the engine can
//! tell a dead server (fatal for the instance) from a rejected record
//! (isolated per item).

use reconcile::OpError;
use thiserror::Error;

/// Result type alias for arrkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from talking to a Sonarr-style server.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (DNS, refused connection, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The server did not answer within the agent timeout.
    #[error("request timed out")]
    Timeout,

    /// The server rejected the API key.
    #[error("unauthorized - the server rejected the API key")]
    Unauthorized,

    /// Endpoint or record does not exist.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Any other non-success HTTP answer; `body` carries the server's
    /// response text for message extraction.
    #[error("HTTP {status} from {path}")]
    Api {
        status: u16,
        path: String,
        body: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("invalid response from {path}: {message}")]
    InvalidResponse { path: String, message: String },

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error (backups, imports).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify a non-success HTTP status.
    pub(crate) fn for_status(status: u16, path: &str, body: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound {
                path: path.to_string(),
            },
            _ => Self::Api {
                status,
                path: path.to_string(),
                body,
            },
        }
    }

    /// Classify a ureq error. Timeouts are recognized by message since the
    /// transport folds them into its own error type.
    pub(crate) fn from_transport(err: ureq::Error) -> Self {
        if let ureq::Error::StatusCode(code) = err {
            return Self::for_status(code, "", String::new());
        }
        let text = err.to_string();
        let lower = text.to_lowercase();
        if lower.contains("timed out") || lower.contains("timeout") {
            return Self::Timeout;
        }
        Self::Network(text)
    }
}

impl From<Error> for OpError {
    fn from(err: Error) -> Self {
        match err {
            Error::Network(message) => Self::Connection(message),
            Error::Timeout => Self::Timeout,
            Error::Unauthorized => Self::Unauthorized,
            Error::NotFound { .. } => Self::NotFound,
            Error::Api { status, body, .. } => Self::Rejected { status, body },
            Error::InvalidResponse { path, message } => {
                Self::Other(format!("invalid response from {path}: {message}"))
            }
            Error::Json(err) => Self::Other(err.to_string()),
            Error::Io(err) => Self::Other(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_status_classification() {
        assert!(matches!(Error::for_status(401, "tag", String::new()), Error::Unauthorized));
        assert!(matches!(
            Error::for_status(404, "tag", String::new()),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            Error::for_status(400, "tag", "bad".to_string()),
            Error::Api { status: 400, .. }
        ));
    }

    #[test]
    fn test_op_error_conversion_carries_body() {
        let err = Error::Api {
            status: 400,
            path: "qualityprofile".to_string(),
            body: r#"{"message": "Should be unique"}"#.to_string(),
        };
        let op: OpError = err.into();
        assert_eq!(op.describe(), "Should be unique");
    }

    #[test]
    fn test_op_error_conversion_unauthorized() {
        let op: OpError = Error::Unauthorized.into();
        assert_eq!(op.describe(), "Authentication failed - check your API key");
    }
}
