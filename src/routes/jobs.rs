use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::app_state::AppState;
use crate::models::job::{Job, JobStatus};
use crate::models::submission::{JobStatusResponse, SubmitJobRequest, SubmitJobResponse};
use crate::routes::error::ApiError;

/// POST /api/submit — Record a job and start processing it in the background.
///
/// The body is parsed as JSON whatever `Content-Type` the client sent.
pub async fn submit_job(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitJobResponse>), ApiError> {
    let request: SubmitJobRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejected job submission body");
        ApiError::InvalidJson
    })?;

    request.validate().map_err(|_| ApiError::CountMismatch)?;

    let job = state.jobs.create(request.visits).await;
    let job_id = job.id;

    metrics::counter!("jobs_submitted_total").increment(1);
    info!(job_id, visits = job.visits.len(), "Job submitted");

    state.processor.spawn(job);

    Ok((StatusCode::CREATED, Json(SubmitJobResponse { job_id })))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub jobid: Option<String>,
}

/// GET /api/status?jobid= — Poll a job's status. Errors are listed only for failed jobs.
pub async fn get_job_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        debug!(error = %rejection, "Rejected status query");
        ApiError::InvalidJobId
    })?;
    let raw = query
        .jobid
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingJobId)?;
    let job_id: u64 = raw.parse().map_err(|_| ApiError::InvalidJobId)?;

    let job = state.jobs.read(job_id).await.ok_or(ApiError::JobNotFound)?;

    let error = (job.status == JobStatus::Failed).then_some(job.errors);

    Ok(Json(JobStatusResponse {
        job_id: job.id,
        status: job.status,
        error,
    }))
}

/// GET /api/jobs/{job_id} — Full job record, including per-image results.
pub async fn get_job(
    State(state): State<AppState>,
    job_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Job>, ApiError> {
    let Path(job_id) = job_id.map_err(|_| ApiError::InvalidJobId)?;
    let job = state.jobs.read(job_id).await.ok_or(ApiError::NoSuchJob)?;
    Ok(Json(job))
}
