use std::fmt;

use serde::{Deserialize, Serialize};

/// Independent fetch groups; each has its own in-flight flag and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamGroup {
    /// Streams fetched for every car at once, plus the global ones.
    Shared,
    /// High-rate telemetry for the focus driver only.
    Focus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Location,
    CarData,
    Position,
    Intervals,
    Laps,
    RaceControl,
    TeamRadio,
    Weather,
}

impl StreamKind {
    pub const ALL: [Self; 8] = [
        Self::Location,
        Self::CarData,
        Self::Position,
        Self::Intervals,
        Self::Laps,
        Self::RaceControl,
        Self::TeamRadio,
        Self::Weather,
    ];

    pub const SHARED: [Self; 7] = [
        Self::Location,
        Self::Position,
        Self::Intervals,
        Self::Laps,
        Self::RaceControl,
        Self::TeamRadio,
        Self::Weather,
    ];

    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::CarData => "car_data",
            Self::Position => "position",
            Self::Intervals => "intervals",
            Self::Laps => "laps",
            Self::RaceControl => "race_control",
            Self::TeamRadio => "team_radio",
            Self::Weather => "weather",
        }
    }

    /// Record field carrying the sample timestamp, also used for range filters.
    #[must_use]
    pub const fn date_field(self) -> &'static str {
        match self {
            Self::Laps => "date_start",
            Self::Location
            | Self::CarData
            | Self::Position
            | Self::Intervals
            | Self::RaceControl
            | Self::TeamRadio
            | Self::Weather => "date",
        }
    }

    #[must_use]
    pub const fn group(self) -> StreamGroup {
        match self {
            Self::CarData => StreamGroup::Focus,
            Self::Location
            | Self::Position
            | Self::Intervals
            | Self::Laps
            | Self::RaceControl
            | Self::TeamRadio
            | Self::Weather => StreamGroup::Shared,
        }
    }

    /// Sparse streams whose whole history feeds the snapshot (standings,
    /// lap count, revealed messages). They are backfilled from session start
    /// after a reset and never trimmed.
    #[must_use]
    pub const fn keeps_history(self) -> bool {
        match self {
            Self::Position | Self::Laps | Self::RaceControl | Self::TeamRadio => true,
            Self::Location | Self::CarData | Self::Intervals | Self::Weather => false,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}
