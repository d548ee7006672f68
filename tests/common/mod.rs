//! Shared helpers for pipeline and API tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use store_visit_jobs::app_state::AppState;
use store_visit_jobs::models::job::Visit;
use store_visit_jobs::models::store::Store;
use store_visit_jobs::routes;
use store_visit_jobs::services::image::{FixedDelay, ImageFetcher};
use store_visit_jobs::services::job_store::JobStore;
use store_visit_jobs::services::processor::JobProcessor;
use store_visit_jobs::services::registry::StoreRegistry;

pub const KNOWN_STORE: &str = "RP00001";
pub const OTHER_STORE: &str = "RP00002";
pub const UNKNOWN_STORE: &str = "RP99999";

pub fn registry() -> StoreRegistry {
    StoreRegistry::from_stores([
        Store {
            area_code: "7100001".to_string(),
            store_name: "RP Mart".to_string(),
            store_id: KNOWN_STORE.to_string(),
        },
        Store {
            area_code: "7100002".to_string(),
            store_name: "Corner Shop".to_string(),
            store_id: OTHER_STORE.to_string(),
        },
    ])
}

/// Processor with no simulated delay, plus the job store it writes to.
pub fn processor(max_concurrent_images: usize) -> (Arc<JobProcessor>, Arc<JobStore>) {
    processor_with_delay(max_concurrent_images, FixedDelay::none())
}

pub fn processor_with_delay(
    max_concurrent_images: usize,
    delay: FixedDelay,
) -> (Arc<JobProcessor>, Arc<JobStore>) {
    let jobs = Arc::new(JobStore::new());
    let processor = JobProcessor::new(
        Arc::new(registry()),
        Arc::clone(&jobs),
        ImageFetcher::new(delay),
        max_concurrent_images,
    );
    (Arc::new(processor), jobs)
}

pub fn visit(store_id: &str, urls: &[String]) -> Visit {
    Visit {
        store_id: store_id.to_string(),
        visit_time: "2024-06-01T10:00:00Z".to_string(),
        image_urls: urls.to_vec(),
        images: None,
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode test png");
    buf.into_inner()
}

/// Serve a PNG of the given size at `route`, optionally after a delay.
pub async fn serve_png(server: &MockServer, route: &str, width: u32, height: u32, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png_bytes(width, height))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

pub async fn serve_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub fn test_app() -> (Router, AppState) {
    let state = AppState::new(registry(), ImageFetcher::new(FixedDelay::none()), 16);
    (routes::router(state.clone()), state)
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    TestResponse { status, body }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> TestResponse {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

/// Poll the status endpoint until the job leaves `ongoing`.
pub async fn wait_for_terminal(app: &Router, job_id: u64) -> TestResponse {
    for _ in 0..200 {
        let response = get(app, &format!("/api/status?jobid={job_id}")).await;
        if response.body["status"] != "ongoing" {
            return response;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {job_id} did not reach a terminal status");
}
