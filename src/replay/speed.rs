use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Playback speed multiplier offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum PlaybackSpeed {
    #[default]
    X1,
    X2,
    X5,
    X10,
    X20,
    X50,
}

impl PlaybackSpeed {
    pub const ALL: [Self; 6] = [
        Self::X1,
        Self::X2,
        Self::X5,
        Self::X10,
        Self::X20,
        Self::X50,
    ];

    #[must_use]
    pub const fn multiplier(self) -> u64 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X5 => 5,
            Self::X10 => 10,
            Self::X20 => 20,
            Self::X50 => 50,
        }
    }

    /// Next faster speed, saturating at the fastest.
    #[must_use]
    pub const fn faster(self) -> Self {
        match self {
            Self::X1 => Self::X2,
            Self::X2 => Self::X5,
            Self::X5 => Self::X10,
            Self::X10 => Self::X20,
            Self::X20 | Self::X50 => Self::X50,
        }
    }

    #[must_use]
    pub const fn slower(self) -> Self {
        match self {
            Self::X1 | Self::X2 => Self::X1,
            Self::X5 => Self::X2,
            Self::X10 => Self::X5,
            Self::X20 => Self::X10,
            Self::X50 => Self::X20,
        }
    }
}

impl TryFrom<u64> for PlaybackSpeed {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.multiplier() == value)
            .ok_or_else(|| ValidationError::InvalidSpeed {
                value: value.to_string(),
            })
    }
}

impl From<PlaybackSpeed> for u64 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.multiplier()
    }
}

impl FromStr for PlaybackSpeed {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('x')
            .or_else(|| trimmed.strip_suffix('X'))
            .unwrap_or(trimmed);
        let value: u64 = digits.parse().map_err(|_err| ValidationError::InvalidSpeed {
            value: s.to_owned(),
        })?;
        Self::try_from(value).map_err(|_err| ValidationError::InvalidSpeed {
            value: s.to_owned(),
        })
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}
