//! Data sources the prefetcher pulls telemetry ranges from.
mod openf1;
mod recorded;
mod traits;

pub use openf1::{DEFAULT_BASE_URL, OpenF1Source};
pub use recorded::RecordedSource;
pub use traits::{DataSource, RangeQuery, fetch_or_empty};
