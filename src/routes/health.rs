use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store_registry: RegistryHealth,
    pub jobs: JobsHealth,
}

#[derive(Serialize)]
pub struct RegistryHealth {
    pub status: String,
    pub stores: usize,
}

#[derive(Serialize)]
pub struct JobsHealth {
    pub status: String,
    pub tracked: usize,
}

/// GET /health — service health with registry and job store status.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    // Every visit fails validation against an empty registry.
    let registry_ok = !state.registry.is_empty();
    let registry_check = RegistryHealth {
        status: if registry_ok { "ok" } else { "empty" }.to_string(),
        stores: state.registry.len(),
    };

    let jobs_check = JobsHealth {
        status: "ok".to_string(),
        tracked: state.jobs.len().await,
    };

    let status_code = if registry_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if registry_ok {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store_registry: registry_check,
            jobs: jobs_check,
        },
    };

    (status_code, Json(response))
}
