//! Error taxonomy shared by the storage, HTTP and authentication layers.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failures of the durable key/value storage backing the session.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents are corrupt: {0}")]
    Corrupt(String),
}

/// Errors surfaced by [`crate::http::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend could not be reached (connect failure, timeout, broken transport).
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered 401. The session has already been cleared when this is returned.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    /// Any other non-success status, carrying the server-supplied message.
    #[error("request rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors surfaced by the auth gateway and the login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    RequestRejected(String),
    #[error("{0}")]
    InvalidCode(String),
    #[error("a login request is already in progress")]
    Busy,
    #[error("the login flow was cancelled")]
    Cancelled,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Maps a transport-level error from a step where a 4xx means "rejected".
    pub(crate) fn rejected(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => AuthError::Network(msg),
            ApiError::Unauthorized { message } | ApiError::Rejected { message, .. } => {
                AuthError::RequestRejected(message)
            }
            ApiError::Decode(msg) | ApiError::Client(msg) => AuthError::RequestRejected(msg),
            ApiError::Storage(e) => AuthError::Storage(e),
        }
    }

    /// Maps a transport-level error from the code verification step.
    pub(crate) fn invalid_code(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { message } => AuthError::InvalidCode(message),
            ApiError::Rejected { status, message } if status.is_client_error() => {
                AuthError::InvalidCode(message)
            }
            other => AuthError::rejected(other),
        }
    }
}

/// Pulls a human readable message out of an error body.
///
/// The portal backend answers with `{"detail": "..."}`, or a list of validation
/// items for malformed requests. Anything else falls back to the status reason.
pub fn server_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                fallback()
            } else {
                messages.join("; ")
            }
        }
        _ => fallback(),
    }
}
