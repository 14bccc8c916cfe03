//! Error types for the Parley client.

use thiserror::Error;

/// Errors that can occur when using the Parley client.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection error (network failure, DNS resolution, etc.).
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP error with status code.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message, taken from the server's error body when present.
        message: String,
    },

    /// Response deserialization error.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns `true` if this error is worth retrying.
    ///
    /// Connection errors and HTTP 5xx/429 responses return `true`.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Deserialization(_) | Self::Configuration(_) => false,
        }
    }

    /// Returns `true` if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the HTTP status if this is an HTTP error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_is_retryable() {
        let err = Error::Connection("timeout".to_string());
        assert!(err.is_retryable());
        assert!(err.is_connection_error());
    }

    #[test]
    fn http_5xx_and_429_are_retryable() {
        for status in [500, 503, 429] {
            let err = Error::Http {
                status,
                message: "server busy".to_string(),
            };
            assert!(err.is_retryable(), "status {status} should be retryable");
        }
    }

    #[test]
    fn http_4xx_is_not_retryable() {
        let err = Error::Http {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn deserialization_error_not_retryable() {
        let err = Error::Deserialization("invalid JSON".to_string());
        assert!(!err.is_retryable());
        assert_eq!(err.status(), None);
    }
}
