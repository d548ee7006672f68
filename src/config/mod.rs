use serde::Deserialize;
use std::time::Duration;

use crate::services::image::RandomDelay;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// CSV file with the store reference dataset (AreaCode, StoreName, StoreID).
    #[serde(default = "default_store_master_path")]
    pub store_master_path: String,

    /// Upper bound on image fetches running at the same time, across all jobs.
    #[serde(default = "default_max_concurrent_images")]
    pub max_concurrent_images: usize,

    /// Lower bound of the simulated per-image compute delay.
    #[serde(default = "default_delay_min_ms")]
    pub processing_delay_min_ms: u64,

    /// Exclusive upper bound of the simulated per-image compute delay.
    #[serde(default = "default_delay_max_ms")]
    pub processing_delay_max_ms: u64,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_store_master_path() -> String {
    "StoreMasterAssignment.csv".to_string()
}

fn default_max_concurrent_images() -> usize {
    64
}

fn default_delay_min_ms() -> u64 {
    100
}

fn default_delay_max_ms() -> u64 {
    400
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Concurrency gate size; zero would deadlock every job, so it is raised to one.
    pub fn image_permits(&self) -> usize {
        self.max_concurrent_images.max(1)
    }

    pub fn processing_delay(&self) -> RandomDelay {
        RandomDelay::new(
            Duration::from_millis(self.processing_delay_min_ms),
            Duration::from_millis(self.processing_delay_max_ms),
        )
    }
}
