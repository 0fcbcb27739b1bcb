use std::time::Duration;
use thiserror::Error;

/// Per-call backend failures. Contained by the crawler as "zero results".
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend '{backend}' unavailable: {reason}")]
    Unavailable { backend: String, reason: String },

    #[error("backend '{backend}' timed out after {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u64 },

    #[error("backend '{backend}' returned HTTP {status}: {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from backend '{backend}': {reason}")]
    MalformedResponse { backend: String, reason: String },

    /// Client construction failed (startup, not per call).
    #[error("failed to build HTTP client for backend '{backend}': {reason}")]
    Client { backend: String, reason: String },
}

pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    pub(crate) fn from_reqwest(backend: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout {
                backend: backend.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            BackendError::MalformedResponse {
                backend: backend.to_string(),
                reason: err.to_string(),
            }
        } else {
            BackendError::Unavailable {
                backend: backend.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Backend that produced the error.
    pub fn backend(&self) -> &str {
        match self {
            BackendError::Unavailable { backend, .. }
            | BackendError::Timeout { backend, .. }
            | BackendError::Status { backend, .. }
            | BackendError::MalformedResponse { backend, .. }
            | BackendError::Client { backend, .. } => backend,
        }
    }
}
