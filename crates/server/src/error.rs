use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use parley_broker::BrokerError;
use parley_store::StoreError;

/// Errors that can occur when running the Parley server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A broker-level error surfaced through the API.
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    /// A store failure on a direct read (history fetches bypass the
    /// broker and hit the store).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Broker(BrokerError::InvalidMessage(_)) => StatusCode::BAD_REQUEST,
            Self::Broker(BrokerError::TooManyConnections(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Broker(_) | Self::Store(_) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::InvalidDraft;

    #[test]
    fn invalid_message_maps_to_400() {
        let err = ServerError::Broker(BrokerError::InvalidMessage(InvalidDraft::EmptyContent));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn connection_cap_maps_to_429() {
        let err = ServerError::Broker(BrokerError::TooManyConnections("alice".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn store_error_converts_and_maps_to_500() {
        let err = ServerError::from(StoreError::Backend("db down".into()));
        assert!(matches!(err, ServerError::Store(_)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn config_error_maps_to_500() {
        let err = ServerError::Config("bad".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
