use axum::http::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{path} answered {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("failed to read response body from {path}")]
    Body {
        path: String,
        #[source]
        source: axum::Error,
    },
    #[error("failed to decode response from {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("deleted id from {path} is not valid UTF-8")]
    InvalidId {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),
    #[error("failed to build request")]
    Request(#[from] axum::http::Error),
    #[error("expected {expected} payload, got {actual}")]
    UnexpectedPayload {
        expected: &'static str,
        actual: &'static str,
    },
}

impl ApiError {
    /// Status of the failed response, if the transport produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
