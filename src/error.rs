// Error handling module
// Normalizes transport and HTTP status information into the client taxonomy

use serde_json::{json, Value};
use thiserror::Error;

/// Errors surfaced by the session core and the API client.
///
/// The client normalizes status and transport information only; mapping a
/// variant to user-facing text is the caller's job.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Login rejected by the backend; prior session state is untouched
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh token absent or rejected; persisted session was cleared
    #[error("Session expired - please log in again")]
    SessionExpired,

    /// 400 with field-level detail preserved for the caller
    #[error("Validation error: {details}")]
    Validation { details: Value },

    /// 403 from the backend
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 404 from the backend
    #[error("Resource not found")]
    NotFound,

    /// 5xx or any other unexpected status
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// No response received
    #[error("Network error: {0}")]
    Network(String),

    /// Storage or programmer error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Map a non-success HTTP status and its raw body to the taxonomy.
    ///
    /// 401 maps to `SessionExpired` here because the retry bookkeeping lives
    /// in the client; by the time a 401 reaches classification the one
    /// allowed refresh-and-retry has already happened.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => ApiError::Validation {
                details: parse_body(&body),
            },
            401 => ApiError::SessionExpired,
            403 => ApiError::Forbidden(extract_message(&body)),
            404 => ApiError::NotFound,
            _ => ApiError::Server {
                status,
                message: extract_message(&body),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connection_failed"
        } else if e.is_decode() {
            "decode_error"
        } else if e.is_request() {
            "request_error"
        } else {
            "unknown"
        };

        ApiError::Network(format!("{} (kind: {})", e, kind))
    }
}

/// Parse an error body as JSON, falling back to a `detail` wrapper
fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| json!({ "detail": body }))
}

/// Pull a human-readable message out of a DRF error body
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.to_string()
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
