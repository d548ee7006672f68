use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode};

/// Source of the simulated downstream compute delay applied after each measurement.
pub trait ProcessingDelay: Send + Sync {
    fn next_delay(&self) -> Duration;
}

/// Uniformly random delay in `[min, max)`. Collapses to `min` when the range is empty.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_millis(400))
    }
}

impl ProcessingDelay for RandomDelay {
    fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..self.max)
    }
}

/// Constant delay, used by tests to make timing deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn none() -> Self {
        Self(Duration::ZERO)
    }
}

impl ProcessingDelay for FixedDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// Downloads images and measures their perimeter.
pub struct ImageFetcher {
    http: Client,
    delay: Arc<dyn ProcessingDelay>,
}

impl ImageFetcher {
    pub fn new(delay: impl ProcessingDelay + 'static) -> Self {
        Self::with_client(Client::new(), delay)
    }

    pub fn with_client(http: Client, delay: impl ProcessingDelay + 'static) -> Self {
        Self {
            http,
            delay: Arc::new(delay),
        }
    }

    /// Fetch `url`, decode it and return `2 * (width + height)`.
    ///
    /// A successful measurement is followed by the configured processing delay.
    /// Failures return immediately.
    pub async fn fetch_and_measure(&self, url: &str) -> Result<u64, ImageError> {
        let response = self.http.get(url).send().await.map_err(ImageError::Download)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ImageError::Status(status));
        }

        let body = response.bytes().await.map_err(ImageError::Body)?;

        // Decoding is CPU-bound; keep it off the async workers.
        let (width, height) = tokio::task::spawn_blocking(move || decode_dimensions(&body))
            .await
            .map_err(|_| ImageError::DecodeAborted)??;

        let perimeter = perimeter(width, height);

        tokio::time::sleep(self.delay.next_delay()).await;

        Ok(perimeter)
    }
}

fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let image = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    Ok((image.width(), image.height()))
}

pub fn perimeter(width: u32, height: u32) -> u64 {
    2 * (u64::from(width) + u64::from(height))
}

/// Display strings double as the per-image error descriptions reported to clients.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to download image")]
    Download(#[source] reqwest::Error),

    #[error("failed to download image: {0}")]
    Status(StatusCode),

    /// The body is part of the payload being decoded, so a truncated read is a decode failure.
    #[error("failed to decode image")]
    Body(#[source] reqwest::Error),

    #[error("failed to decode image")]
    Decode(#[source] image::ImageError),

    #[error("failed to decode image")]
    DecodeAborted,
}
