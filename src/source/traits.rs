use async_trait::async_trait;

use crate::error::SourceError;
use crate::telemetry::{DriverNumber, SessionInfo, StreamBatch, StreamKind};

/// One range request: samples of `kind` with a timestamp in
/// `[start_ms, end_ms)`, optionally for a single driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub session_key: u32,
    pub kind: StreamKind,
    pub start_ms: u64,
    pub end_ms: u64,
    pub driver_number: Option<DriverNumber>,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Loads session bounds and roster.
    ///
    /// # Errors
    ///
    /// Returns an error when the session cannot be found or the source is
    /// unreachable.
    async fn session_info(&self, session_key: u32) -> Result<SessionInfo, SourceError>;

    /// Fetches one range of one stream. Ordering of the returned samples is
    /// not guaranteed.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// decoded.
    async fn fetch_range(&self, query: &RangeQuery) -> Result<StreamBatch, SourceError>;
}

/// Fetches a range, degrading any failure to an empty batch.
///
/// A failed range reads as "no data for this range": it is merged like any
/// other result, so the replay keeps moving with fewer visible streams.
pub async fn fetch_or_empty(source: &dyn DataSource, query: &RangeQuery) -> StreamBatch {
    match source.fetch_range(query).await {
        Ok(batch) => batch,
        Err(err) => {
            tracing::warn!(
                "Fetching {} [{}, {}) failed: {}",
                query.kind,
                query.start_ms,
                query.end_ms,
                err
            );
            StreamBatch::empty(query.kind)
        }
    }
}
