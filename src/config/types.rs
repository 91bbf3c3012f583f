use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{parse_duration_value, parse_offset_value};
use crate::error::ValidationError;
use crate::replay::PlaybackSpeed;
use crate::telemetry::DriverNumber;

/// Every option a config file may set. Keys mirror the long CLI flags with
/// underscores.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub session_key: Option<u32>,
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub speed: Option<PlaybackSpeed>,
    pub start: Option<DurationValue>,
    pub focus: Option<DriverNumber>,
    pub step: Option<DurationValue>,
    pub lookahead: Option<DurationValue>,
    pub chunk: Option<DurationValue>,
    pub focus_chunk: Option<DurationValue>,
    pub retention: Option<DurationValue>,
    pub min_tick: Option<DurationValue>,
    pub standings_scan_depth: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub no_ui: Option<bool>,
    pub no_color: Option<bool>,
    pub verbose: Option<bool>,
}

/// A duration given either as whole seconds or as text such as `"250ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            Self::Seconds(0) => Err(ValidationError::DurationZero),
            Self::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            Self::Text(text) => parse_duration_value(text),
        }
    }

    pub(crate) fn to_offset(&self) -> Result<Duration, ValidationError> {
        match self {
            Self::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            Self::Text(text) => parse_offset_value(text),
        }
    }
}
