pub mod error;
pub mod health;
pub mod jobs;
pub mod metrics;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// API routes bound to the shared state. Middleware and `/metrics` are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/submit", post(jobs::submit_job))
        .route("/api/submit/", post(jobs::submit_job))
        .route("/api/status", get(jobs::get_job_status))
        .route("/api/jobs/{job_id}", get(jobs::get_job))
        .with_state(state)
}
