//! Typed telemetry streams and conversion from raw source records.
mod batch;
mod ingest;
mod kind;
mod samples;
mod session;

pub use batch::StreamBatch;
pub use ingest::{format_timestamp_ms, ingest_records, parse_timestamp_ms};
pub use kind::{StreamGroup, StreamKind};
pub use samples::{
    CarDataSample, DriverNumber, Gap, IntervalSample, LapSample, LocationSample, PositionSample,
    RaceControlMessage, TeamRadioClip, WeatherSample,
};
pub use session::{DriverInfo, SessionInfo};
