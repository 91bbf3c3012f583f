use std::time::Duration;

use super::clock::DEFAULT_MIN_TICK;
use super::speed::PlaybackSpeed;

/// Real-time look-ahead kept buffered at 1x before a new fetch is issued.
pub const DEFAULT_LOOKAHEAD: Duration = Duration::from_secs(10);
/// Session time covered by one fetch at 1x.
pub const DEFAULT_CHUNK: Duration = Duration::from_secs(30);
/// Range fetched right after the focus driver changes.
pub const DEFAULT_FOCUS_CHUNK: Duration = Duration::from_secs(10);
/// History kept behind the play head; seeking further back refetches.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(10 * 60);
/// Samples scanned backward when rebuilding standings.
pub const DEFAULT_STANDINGS_SCAN_DEPTH: usize = 500;

/// Tuning knobs for one replay engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    pub min_tick: Duration,
    pub lookahead: Duration,
    pub chunk: Duration,
    pub focus_chunk: Duration,
    pub retention: Duration,
    pub standings_scan_depth: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            min_tick: DEFAULT_MIN_TICK,
            lookahead: DEFAULT_LOOKAHEAD,
            chunk: DEFAULT_CHUNK,
            focus_chunk: DEFAULT_FOCUS_CHUNK,
            retention: DEFAULT_RETENTION,
            standings_scan_depth: DEFAULT_STANDINGS_SCAN_DEPTH,
        }
    }
}

impl ReplayConfig {
    /// Look-ahead threshold in session time. Faster playback drains the
    /// buffer faster, so the margin scales with the multiplier to keep the
    /// same wall-clock safety window.
    #[must_use]
    pub fn threshold_ms(&self, speed: PlaybackSpeed) -> u64 {
        duration_ms(self.lookahead).saturating_mul(speed.multiplier())
    }

    #[must_use]
    pub fn chunk_ms(&self, speed: PlaybackSpeed) -> u64 {
        duration_ms(self.chunk)
            .saturating_mul(speed.multiplier())
            .max(1)
    }

    #[must_use]
    pub fn focus_chunk_ms(&self) -> u64 {
        duration_ms(self.focus_chunk).max(1)
    }

    #[must_use]
    pub fn retention_ms(&self) -> u64 {
        duration_ms(self.retention)
    }

    #[must_use]
    pub fn needs_fetch(&self, buffered_until: u64, current_ms: u64, speed: PlaybackSpeed) -> bool {
        buffered_until.saturating_sub(current_ms) < self.threshold_ms(speed)
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
