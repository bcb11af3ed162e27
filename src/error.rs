use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, RelayError>;

/// Every way a relay request can terminate early.
///
/// Validation variants are raised by the request normalizer before any
/// upstream call is made. The remaining variants come out of the relay itself.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing url parameter")]
    MissingParameter,

    #[error("Invalid URL encoding")]
    InvalidEncoding,

    #[error("Invalid URL format")]
    InvalidUrlFormat,

    /// Upstream answered with a non-2xx status; mirrored to the caller
    #[error("Upstream request failed with status {status}")]
    UpstreamFailure {
        status: StatusCode,
        status_text: String,
    },

    /// Network-level failure talking to the upstream (connect, timeout, body read)
    #[error("{0}")]
    FetchError(#[from] reqwest::Error),

    #[error("{0}")]
    InternalError(String),
}

impl RelayError {
    /// HTTP status the caller sees for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingParameter
            | RelayError::InvalidEncoding
            | RelayError::InvalidUrlFormat => StatusCode::BAD_REQUEST,
            RelayError::UpstreamFailure { status, .. } => *status,
            RelayError::FetchError(_) | RelayError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RelayError::UpstreamFailure {
                status,
                status_text,
            } => json!({
                "error": "Upstream request failed",
                "status": status.as_u16(),
                "statusText": status_text,
            }),
            RelayError::FetchError(_) | RelayError::InternalError(_) => json!({
                "error": "Internal server error",
                "message": self.to_string(),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
