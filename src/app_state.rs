use std::sync::Arc;

use crate::services::{
    image::ImageFetcher, job_store::JobStore, processor::JobProcessor, registry::StoreRegistry,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StoreRegistry>,
    pub jobs: Arc<JobStore>,
    pub processor: Arc<JobProcessor>,
}

impl AppState {
    pub fn new(registry: StoreRegistry, fetcher: ImageFetcher, max_concurrent_images: usize) -> Self {
        let registry = Arc::new(registry);
        let jobs = Arc::new(JobStore::new());
        let processor = Arc::new(JobProcessor::new(
            Arc::clone(&registry),
            Arc::clone(&jobs),
            fetcher,
            max_concurrent_images,
        ));
        Self {
            registry,
            jobs,
            processor,
        }
    }
}
