//! Error types for the order API client.
//!
//! # Design
//! Every non-2xx response becomes `ApiError::Http` carrying the status code
//! and a message taken from the server's `{"error": "..."}` envelope. There
//! is no per-status variant: callers match on `status()` when they need to
//! tell a missing order from a rejected scan.

use thiserror::Error;

/// Message used when a failing response has no usable `error` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Message used for any failed export download, whatever the body says.
pub const DOWNLOAD_FAILED: &str = "Failed to download file";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The round-trip itself failed (connection refused, DNS, broken body).
    #[error("transport failed: {0}")]
    Transport(String),

    /// Writing a downloaded file to disk failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            message: message.into(),
        }
    }

    /// HTTP status for classified server failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-supplied (or fallback) message for classified server failures.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display() {
        let err = ApiError::http(404, "Order not found");
        assert_eq!(err.to_string(), "HTTP 404: Order not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), Some("Order not found"));
        assert!(err.is_not_found());
    }

    #[test]
    fn non_http_errors_have_no_status() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), None);
        assert!(!err.is_not_found());
    }
}
