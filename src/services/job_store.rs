use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::job::{Job, JobStatus, Visit};

/// In-memory job records, keyed by job id. Records live for the lifetime of the process.
#[derive(Debug)]
pub struct JobStore {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    jobs: HashMap<u64, Job>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                jobs: HashMap::new(),
            }),
        }
    }

    /// Allocate the next job id and record the job as ongoing.
    pub async fn create(&self, visits: Vec<Visit>) -> Job {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let job = Job {
            id: inner.next_id,
            status: JobStatus::Ongoing,
            visits,
            errors: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.next_id += 1;
        inner.jobs.insert(job.id, job.clone());
        job
    }

    /// Snapshot of the job record, if it exists.
    pub async fn read(&self, id: u64) -> Option<Job> {
        self.inner.read().await.jobs.get(&id).cloned()
    }

    /// Replace the stored record with `job`.
    pub async fn write(&self, mut job: Job) {
        job.updated_at = Utc::now();
        self.inner.write().await.jobs.insert(job.id, job);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
