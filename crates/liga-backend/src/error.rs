// Errors from the hosted auth and data services.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The service answered with an error status. `message` is the text the
    /// service provided, passed through unmodified.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    /// The request was refused before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not authenticated")]
    NotAuthenticated,
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            BackendError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull the human-readable message out of an error body.
///
/// The auth service uses `msg` or `error_description`, the REST service uses
/// `message`; `error` is the last resort. Non-JSON bodies are returned as-is.
pub(crate) fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "error_description", "message", "error"] {
            if let Some(text) = v.get(key).and_then(Value::as_str) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("request failed with status {status}")
    } else {
        trimmed.to_string()
    }
}

/// Turn a non-success response into `BackendError::Api`.
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: extract_error_message(status.as_u16(), &body),
    })
}
