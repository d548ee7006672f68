use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use store_visit_jobs::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::{image::ImageFetcher, registry::StoreRegistry},
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing store-visit-jobs server");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!("jobs_submitted_total", "Total jobs accepted for processing");
    metrics::describe_counter!(
        "jobs_finished_total",
        "Jobs that reached a terminal status, by status"
    );
    metrics::describe_counter!(
        "images_processed_total",
        "Images fetched and measured, by outcome"
    );
    metrics::describe_histogram!(
        "job_processing_seconds",
        "Wall-clock time from job start to terminal status"
    );
    metrics::describe_gauge!("jobs_in_flight", "Jobs currently being processed");

    tracing::info!(path = %config.store_master_path, "Loading store registry");
    let registry = match StoreRegistry::load(&config.store_master_path) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, path = %config.store_master_path, "Failed to load store registry");
            std::process::exit(1);
        }
    };

    let fetcher = ImageFetcher::new(config.processing_delay());
    let state = AppState::new(registry, fetcher, config.image_permits());

    let app = routes::router(state)
        .route(
            "/metrics",
            get(routes::metrics::render_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
