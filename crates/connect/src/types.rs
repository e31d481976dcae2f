//! Request and error-body wire types for the backend API.
//!
//! Response payloads deserialize directly into the `pennyflow-core` models;
//! only outbound request bodies and the structured error envelope live here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ParseRequest<'a> {
    pub input: &'a str,
}

/// Structured error body the backend returns on non-success statuses.
/// Either field may carry the human-readable message.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}
