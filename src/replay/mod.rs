//! Replay engine: session clock, buffered streams, prefetching, and the
//! controller that ties them together.
mod buffers;
mod clock;
mod config;
mod controller;
mod prefetch;
mod snapshot;
mod speed;


pub use buffers::SessionBuffers;
pub use clock::{ClockAdvance, DEFAULT_MIN_TICK, SessionClock};
pub use config::{
    DEFAULT_CHUNK, DEFAULT_FOCUS_CHUNK, DEFAULT_LOOKAHEAD, DEFAULT_RETENTION,
    DEFAULT_STANDINGS_SCAN_DEPTH, ReplayConfig,
};
pub use controller::ReplayController;
pub use prefetch::{FetchOutcome, FetchPlan, Prefetcher};
pub use snapshot::{Materializer, Snapshot, Standing, latest_per_driver};
pub use speed::PlaybackSpeed;
