use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::models::job::{ImageResult, Job, JobError};
use crate::services::image::ImageFetcher;
use crate::services::job_store::JobStore;
use crate::services::registry::StoreRegistry;

pub const STORE_NOT_FOUND: &str = "store id not found";
const VISIT_ABORTED: &str = "visit processing aborted";
const IMAGE_ABORTED: &str = "image processing aborted";

/// Runs submitted jobs: one task per visit, one task per image within a visit.
///
/// All visits and images run to completion regardless of sibling failures.
/// The job is written back to the [`JobStore`] exactly once, with a terminal status.
pub struct JobProcessor {
    registry: Arc<StoreRegistry>,
    jobs: Arc<JobStore>,
    fetcher: Arc<ImageFetcher>,
    image_permits: Arc<Semaphore>,
}

impl JobProcessor {
    pub fn new(
        registry: Arc<StoreRegistry>,
        jobs: Arc<JobStore>,
        fetcher: ImageFetcher,
        max_concurrent_images: usize,
    ) -> Self {
        Self {
            registry,
            jobs,
            fetcher: Arc::new(fetcher),
            image_permits: Arc::new(Semaphore::new(max_concurrent_images.max(1))),
        }
    }

    /// Process `job` in the background.
    pub fn spawn(self: &Arc<Self>, job: Job) -> tokio::task::JoinHandle<()> {
        let processor = Arc::clone(self);
        tokio::spawn(async move { processor.process(job).await })
    }

    /// Process every visit of `job`, settle its status and persist it.
    pub async fn process(&self, job: Job) {
        let started = Instant::now();
        let job_id = job.id;
        let visit_count = job.visits.len();

        metrics::gauge!("jobs_in_flight").increment(1.0);
        info!(job_id, visits = visit_count, "Processing job");

        // Visit inputs are copied out up front; the shared job only receives results.
        let inputs: Vec<(String, Vec<String>)> = job
            .visits
            .iter()
            .map(|visit| (visit.store_id.clone(), visit.image_urls.clone()))
            .collect();
        let shared = Arc::new(Mutex::new(job));

        let handles: Vec<_> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, (store_id, urls))| {
                let worker = VisitWorker {
                    job_id,
                    index,
                    store_id,
                    urls,
                    registry: Arc::clone(&self.registry),
                    fetcher: Arc::clone(&self.fetcher),
                    image_permits: Arc::clone(&self.image_permits),
                    shared: Arc::clone(&shared),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        let outcomes = join_all(handles).await;

        let mut job = shared.lock().await;
        for (index, outcome) in outcomes.into_iter().enumerate() {
            if let Err(e) = outcome {
                let store_id = job.visits[index].store_id.clone();
                error!(job_id, store_id = %store_id, error = %e, "Visit task aborted");
                job.errors.push(JobError::new(store_id, VISIT_ABORTED));
            }
        }

        job.finish();
        let finished = job.clone();
        drop(job);

        let elapsed = started.elapsed();
        info!(
            job_id,
            status = %finished.status,
            errors = finished.errors.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Job finished"
        );
        metrics::counter!("jobs_finished_total", "status" => finished.status.to_string())
            .increment(1);
        metrics::histogram!("job_processing_seconds").record(elapsed.as_secs_f64());
        metrics::gauge!("jobs_in_flight").decrement(1.0);

        self.jobs.write(finished).await;
    }
}

/// Handles one visit: store validation, then image fan-out and fan-in.
struct VisitWorker {
    job_id: u64,
    index: usize,
    store_id: String,
    urls: Vec<String>,
    registry: Arc<StoreRegistry>,
    fetcher: Arc<ImageFetcher>,
    image_permits: Arc<Semaphore>,
    shared: Arc<Mutex<Job>>,
}

impl VisitWorker {
    async fn run(self) {
        if !self.registry.exists(&self.store_id) {
            warn!(job_id = self.job_id, store_id = %self.store_id, "Unknown store id");
            self.shared
                .lock()
                .await
                .errors
                .push(JobError::new(&self.store_id, STORE_NOT_FOUND));
            return;
        }

        let handles: Vec<_> = self
            .urls
            .iter()
            .cloned()
            .map(|url| {
                let fetcher = Arc::clone(&self.fetcher);
                let permits = Arc::clone(&self.image_permits);
                let shared = Arc::clone(&self.shared);
                let store_id = self.store_id.clone();
                let job_id = self.job_id;
                tokio::spawn(async move {
                    measure_image(job_id, &store_id, url, &fetcher, &permits, &shared).await
                })
            })
            .collect();

        let mut aborted = 0;
        // Slot `i` always belongs to `urls[i]`, whatever order the tasks finish in.
        let results: Vec<ImageResult> = join_all(handles)
            .await
            .into_iter()
            .zip(&self.urls)
            .map(|(outcome, url)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    error!(job_id = self.job_id, url = %url, error = %e, "Image task aborted");
                    aborted += 1;
                    ImageResult::failed(url.as_str(), IMAGE_ABORTED)
                }
            })
            .collect();

        let mut job = self.shared.lock().await;
        for _ in 0..aborted {
            job.errors.push(JobError::new(&self.store_id, IMAGE_ABORTED));
        }
        job.visits[self.index].images = Some(results);
    }
}

async fn measure_image(
    job_id: u64,
    store_id: &str,
    url: String,
    fetcher: &ImageFetcher,
    permits: &Semaphore,
    shared: &Mutex<Job>,
) -> ImageResult {
    let measured = match permits.acquire().await {
        Ok(_permit) => fetcher.fetch_and_measure(&url).await.map_err(|e| e.to_string()),
        // The gate is never closed while the processor is alive.
        Err(_) => Err(IMAGE_ABORTED.to_string()),
    };

    let description = match measured {
        Ok(perimeter) => {
            metrics::counter!("images_processed_total", "outcome" => "ok").increment(1);
            return ImageResult::measured(url, perimeter);
        }
        Err(description) => description,
    };

    warn!(job_id, store_id = %store_id, url = %url, error = %description, "Image failed");
    metrics::counter!("images_processed_total", "outcome" => "error").increment(1);
    shared
        .lock()
        .await
        .errors
        .push(JobError::new(store_id, description.clone()));
    ImageResult::failed(url, description)
}
