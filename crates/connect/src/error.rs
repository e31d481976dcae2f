//! Error types for the API client.

use thiserror::Error;

use pennyflow_core::errors::{Error as CoreError, GatewayError};

/// Result type alias for API client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the backend.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Missing or malformed credentials on the client side.
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ApiError {
    /// Create an API error from status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an auth error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<ApiError> for GatewayError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => GatewayError::Network(e.to_string()),
            ApiError::Json(e) => GatewayError::Payload(e.to_string()),
            ApiError::Api { status, message } => GatewayError::Api { status, message },
            ApiError::Auth(message) => GatewayError::Auth(message),
        }
    }
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        CoreError::Gateway(err.into())
    }
}
