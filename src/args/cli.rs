use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::parsers::{
    parse_driver_number, parse_duration_arg, parse_offset_arg, parse_positive_usize, parse_speed,
};
use crate::replay::{PlaybackSpeed, ReplayConfig};
use crate::source::DEFAULT_BASE_URL;
use crate::telemetry::DriverNumber;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Motorsport session replay - virtual session clock, look-ahead telemetry buffering, interpolated snapshots, and a terminal player.",
    next_help_heading = "Advanced Options"
)]
pub struct ReplayArgs {
    /// Session to replay from the live data API
    #[arg(
        long = "session-key",
        short = 's',
        conflicts_with = "data_dir",
        help_heading = "Common Options"
    )]
    pub session_key: Option<u32>,

    /// Replay a recorded session directory (session.json + <stream>.json files)
    #[arg(long = "data-dir", short = 'd', help_heading = "Common Options")]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the telemetry API
    #[arg(
        long = "base-url",
        env = "PADDOCK_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help_heading = "Common Options"
    )]
    pub base_url: String,

    /// Playback speed multiplier (1, 2, 5, 10, 20, 50)
    #[arg(
        long,
        short = 'x',
        default_value = "1",
        value_parser = parse_speed,
        help_heading = "Common Options"
    )]
    pub speed: PlaybackSpeed,

    /// Offset into the session to start from (e.g. 90s, 25m)
    #[arg(long, default_value = "0s", value_parser = parse_offset_arg, help_heading = "Common Options")]
    pub start: Duration,

    /// Driver number whose car telemetry is shown
    #[arg(long, short = 'f', value_parser = parse_driver_number, help_heading = "Common Options")]
    pub focus: Option<DriverNumber>,

    /// Seek distance of the step keys
    #[arg(long, default_value = "10s", value_parser = parse_duration_arg)]
    pub step: Duration,

    /// Real-time look-ahead kept buffered at 1x
    #[arg(long, default_value = "10s", value_parser = parse_duration_arg)]
    pub lookahead: Duration,

    /// Session time covered by one fetch at 1x
    #[arg(long, default_value = "30s", value_parser = parse_duration_arg)]
    pub chunk: Duration,

    /// Range fetched right after the focus driver changes
    #[arg(long = "focus-chunk", default_value = "10s", value_parser = parse_duration_arg)]
    pub focus_chunk: Duration,

    /// History kept behind the play head
    #[arg(long, default_value = "10m", value_parser = parse_duration_arg)]
    pub retention: Duration,

    /// Minimum wall-clock time between processed ticks
    #[arg(long = "min-tick", default_value = "32ms", value_parser = parse_duration_arg)]
    pub min_tick: Duration,

    /// Samples scanned backward when rebuilding standings
    #[arg(
        long = "standings-scan-depth",
        default_value = "500",
        value_parser = parse_positive_usize
    )]
    pub standings_scan_depth: usize,

    /// Request timeout for the telemetry API
    #[arg(long, default_value = "10s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Print the snapshot at --start as JSON instead of starting the player
    #[arg(long = "no-ui", help_heading = "Common Options")]
    pub no_ui: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Config file (TOML or JSON); defaults to paddock.toml / paddock.json
    #[arg(long, short = 'c')]
    pub config: Option<String>,
}

impl ReplayArgs {
    #[must_use]
    pub const fn replay_config(&self) -> ReplayConfig {
        ReplayConfig {
            min_tick: self.min_tick,
            lookahead: self.lookahead,
            chunk: self.chunk,
            focus_chunk: self.focus_chunk,
            retention: self.retention,
            standings_scan_depth: self.standings_scan_depth,
        }
    }
}
