use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Client-facing request errors, rendered as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid JSON")]
    InvalidJson,

    #[error("count does not match visits")]
    CountMismatch,

    #[error("jobid parameter missing")]
    MissingJobId,

    #[error("invalid jobid")]
    InvalidJobId,

    /// Unknown id on the status endpoint, which reports it as a bad request.
    #[error("job not found")]
    JobNotFound,

    /// Unknown id on the job record endpoint.
    #[error("job not found")]
    NoSuchJob,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoSuchJob => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
