//! Error taxonomy for backend operation collaborators.
//!
//! Backends collapse their transport- and protocol-level failures into
//! [`OpError`] at the engine boundary. The reconciler never aborts a pass on
//! a per-item error; it records [`OpError::describe`] output and moves on.

use serde_json::Value;
use thiserror::Error;

/// Maximum length of raw error text surfaced to operators.
const MAX_MESSAGE_LEN: usize = 200;

/// Error returned by backend operations and mappers.
#[derive(Debug, Error)]
pub enum OpError {
    /// The backend could not be reached at all.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The backend did not answer in time.
    #[error("request timed out")]
    Timeout,

    /// The backend rejected our credentials.
    #[error("authentication rejected (401)")]
    Unauthorized,

    /// The endpoint or record does not exist.
    #[error("not found (404)")]
    NotFound,

    /// The backend rejected the request (validation error, conflict, ...).
    #[error("request rejected (HTTP {status})")]
    Rejected {
        status: u16,
        /// Raw response body; [`describe`](OpError::describe) digs the
        /// backend's message out of it.
        body: String,
    },

    /// The operation does not exist for this resource type (singleton or
    /// fixed-cardinality resources cannot be created or deleted).
    #[error("operation not supported for this resource type")]
    Unsupported,

    /// A mapping precondition failed (missing reference, absent server
    /// record). A configuration or call-order defect, reported per item.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Anything else, as text.
    #[error("{0}")]
    Other(String),
}

impl OpError {
    /// Short operator-facing description of the failure.
    ///
    /// For rejections this digs a `message` field out of a structured JSON
    /// body before falling back to the (truncated) body text; stringly
    /// errors go through the same substring heuristics operators would
    /// apply by eye. Advisory text, not part of the error's identity.
    pub fn describe(&self) -> String {
        match self {
            Self::Connection(_) => "Connection refused - is the server running?".to_string(),
            Self::Timeout => "Request timeout - server not responding".to_string(),
            Self::Unauthorized => "Authentication failed - check your API key".to_string(),
            Self::NotFound => "Resource not found - API endpoint may not exist".to_string(),
            Self::Rejected { body, .. } => describe_body(body),
            Self::Unsupported => "Operation not supported for this resource type".to_string(),
            Self::Precondition(message) => message.clone(),
            Self::Other(message) => describe_raw(message),
        }
    }
}

/// Extract a readable message from a response body.
fn describe_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => truncate(&Value::Object(map).to_string()),
        },
        // Some endpoints answer with a bare array of validation errors.
        Ok(other @ Value::Array(_)) => truncate(&other.to_string()),
        _ => describe_raw(body),
    }
}

/// Substring classification for errors that arrive as plain text.
pub fn describe_raw(error: &str) -> String {
    let lower = error.to_lowercase();
    if lower.contains("connection refused") {
        return "Connection refused - is the server running?".to_string();
    }
    if lower.contains("timeout") || lower.contains("timed out") {
        return "Request timeout - server not responding".to_string();
    }
    if error.contains("Unauthorized") || error.contains("401") {
        return "Authentication failed - check your API key".to_string();
    }
    if error.contains("Not Found") || error.contains("404") {
        return "Resource not found - API endpoint may not exist".to_string();
    }

    truncate(error)
}

fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return text.to_string();
    }
    text.chars().take(MAX_MESSAGE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_connection() {
        let err = OpError::Connection("tcp connect error".to_string());
        assert_eq!(err.describe(), "Connection refused - is the server running?");
    }

    #[test]
    fn test_describe_rejected_with_structured_message() {
        let err = OpError::Rejected {
            status: 400,
            body: r#"{"message": "Should be unique", "severity": "error"}"#.to_string(),
        };
        assert_eq!(err.describe(), "Should be unique");
    }

    #[test]
    fn test_describe_rejected_without_message_field() {
        let err = OpError::Rejected {
            status: 400,
            body: r#"{"severity": "error"}"#.to_string(),
        };
        assert!(err.describe().contains("severity"));
    }

    #[test]
    fn test_describe_rejected_plain_body() {
        let err = OpError::Rejected {
            status: 500,
            body: "Internal Server Error".to_string(),
        };
        assert_eq!(err.describe(), "Internal Server Error");
    }

    #[test]
    fn test_describe_raw_heuristics() {
        assert_eq!(
            describe_raw("error trying to connect: Connection refused (os error 111)"),
            "Connection refused - is the server running?"
        );
        assert_eq!(
            describe_raw("operation timed out after 30s"),
            "Request timeout - server not responding"
        );
        assert_eq!(
            describe_raw("http status 401 Unauthorized"),
            "Authentication failed - check your API key"
        );
        assert_eq!(
            describe_raw("404 Not Found"),
            "Resource not found - API endpoint may not exist"
        );
    }

    #[test]
    fn test_describe_raw_truncates() {
        let long = "x".repeat(500);
        assert_eq!(describe_raw(&long).chars().count(), 200);
    }

    #[test]
    fn test_describe_precondition_passthrough() {
        let err = OpError::Precondition("quality definition 'Weird' not present on server".into());
        assert_eq!(
            err.describe(),
            "quality definition 'Weird' not present on server"
        );
    }
}
