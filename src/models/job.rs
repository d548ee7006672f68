use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle of a submitted job. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Ongoing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Ongoing)
    }
}

/// A batch of store visits submitted together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "job_id")]
    pub id: u64,
    pub status: JobStatus,
    pub visits: Vec<Visit>,
    #[serde(rename = "error", default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JobError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Settle the terminal status from the recorded errors. Any error fails the whole job.
    pub fn finish(&mut self) {
        self.status = if self.errors.is_empty() {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
    }
}

/// One store's set of images within a job.
///
/// `images` stays `None` until the visit's worker installs results, and stays
/// `None` for good when the store id is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub visit_time: String,
    #[serde(rename = "image_url", default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageResult>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResult {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perimeter: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageResult {
    pub fn measured(url: impl Into<String>, perimeter: u64) -> Self {
        Self {
            url: url.into(),
            perimeter: Some(perimeter),
            error: None,
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            perimeter: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A failure attributed to a store within a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobError {
    pub store_id: String,
    pub error: String,
}

impl JobError {
    pub fn new(store_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            error: error.into(),
        }
    }
}
