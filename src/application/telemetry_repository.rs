// Repository trait for telemetry feed access
use crate::domain::telemetry::{RawSample, TimeWindow};
use async_trait::async_trait;
use thiserror::Error;

/// Why a fetch produced no usable batch. Every variant is recoverable.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Failed to reach feed: {0}")]
    Transport(String),
    #[error("Failed to fetch data: {status}")]
    Http { status: u16 },
    #[error("Malformed feed response: {0}")]
    Malformed(String),
    #[error("No data available from feed")]
    EmptyFeed,
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Fetch every feed entry of `channel_id` inside `window`.
    /// An empty batch is reported as `AcquisitionError::EmptyFeed`.
    async fn fetch_feeds(
        &self,
        channel_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<RawSample>, AcquisitionError>;
}
