//! Core error types for the Pennyflow client.
//!
//! This module defines transport- and storage-agnostic error types. Errors
//! specific to the HTTP layer (reqwest) or the state store (Diesel, SQLite)
//! are converted to these types by the `connect` and `storage-sqlite` crates.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Normalized errors for calls that cross the network.
///
/// The gateway collapses every transport outcome into one of these variants so
/// callers can surface a single human-readable message. `Api` carries the
/// message parsed from a structured error body; when the body is not JSON the
/// gateway falls back to the raw status text.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP error status with a message extracted from the response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport-level failure, no usable response.
    #[error("Network error: {0}")]
    Network(String),

    /// The response arrived but its payload could not be decoded.
    #[error("Invalid response payload: {0}")]
    Payload(String),

    /// Missing or malformed credentials on the client side.
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl GatewayError {
    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by the durable device-state store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open state store: {0}")]
    Open(String),

    #[error("State store query failed: {0}")]
    Query(String),

    #[error("State store migration failed: {0}")]
    Migration(String),
}

/// Client-side validation errors. These never reach the network and are
/// reported per-field by the caller.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Please enter a valid email")]
    InvalidEmail,

    #[error("Required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Amount must not be negative")]
    NegativeAmount,

    #[error("Confidence must be between 0 and 1")]
    ConfidenceOutOfRange,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
