use super::kind::StreamKind;
use super::samples::{
    CarDataSample, DriverNumber, IntervalSample, LapSample, LocationSample, PositionSample,
    RaceControlMessage, TeamRadioClip, WeatherSample,
};
use crate::timeline::Timestamped;

/// Samples of one stream kind returned by a single range fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamBatch {
    Location(Vec<LocationSample>),
    CarData(Vec<CarDataSample>),
    Position(Vec<PositionSample>),
    Intervals(Vec<IntervalSample>),
    Laps(Vec<LapSample>),
    RaceControl(Vec<RaceControlMessage>),
    TeamRadio(Vec<TeamRadioClip>),
    Weather(Vec<WeatherSample>),
}

impl StreamBatch {
    #[must_use]
    pub const fn empty(kind: StreamKind) -> Self {
        match kind {
            StreamKind::Location => Self::Location(Vec::new()),
            StreamKind::CarData => Self::CarData(Vec::new()),
            StreamKind::Position => Self::Position(Vec::new()),
            StreamKind::Intervals => Self::Intervals(Vec::new()),
            StreamKind::Laps => Self::Laps(Vec::new()),
            StreamKind::RaceControl => Self::RaceControl(Vec::new()),
            StreamKind::TeamRadio => Self::TeamRadio(Vec::new()),
            StreamKind::Weather => Self::Weather(Vec::new()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> StreamKind {
        match self {
            Self::Location(_) => StreamKind::Location,
            Self::CarData(_) => StreamKind::CarData,
            Self::Position(_) => StreamKind::Position,
            Self::Intervals(_) => StreamKind::Intervals,
            Self::Laps(_) => StreamKind::Laps,
            Self::RaceControl(_) => StreamKind::RaceControl,
            Self::TeamRadio(_) => StreamKind::TeamRadio,
            Self::Weather(_) => StreamKind::Weather,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Location(samples) => samples.len(),
            Self::CarData(samples) => samples.len(),
            Self::Position(samples) => samples.len(),
            Self::Intervals(samples) => samples.len(),
            Self::Laps(samples) => samples.len(),
            Self::RaceControl(samples) => samples.len(),
            Self::TeamRadio(samples) => samples.len(),
            Self::Weather(samples) => samples.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the samples with a timestamp in `[start_ms, end_ms)`, optionally
    /// restricted to one driver. Streams without a driver ignore the filter.
    #[must_use]
    pub fn select(&self, start_ms: u64, end_ms: u64, driver: Option<DriverNumber>) -> Self {
        let range = SelectRange {
            start_ms,
            end_ms,
            driver,
        };
        match self {
            Self::Location(samples) => {
                Self::Location(range.pick(samples, |s| Some(s.driver_number)))
            }
            Self::CarData(samples) => Self::CarData(range.pick(samples, |s| Some(s.driver_number))),
            Self::Position(samples) => {
                Self::Position(range.pick(samples, |s| Some(s.driver_number)))
            }
            Self::Intervals(samples) => {
                Self::Intervals(range.pick(samples, |s| Some(s.driver_number)))
            }
            Self::Laps(samples) => Self::Laps(range.pick(samples, |s| Some(s.driver_number))),
            Self::RaceControl(samples) => Self::RaceControl(range.pick(samples, |s| s.driver_number)),
            Self::TeamRadio(samples) => {
                Self::TeamRadio(range.pick(samples, |s| Some(s.driver_number)))
            }
            Self::Weather(samples) => Self::Weather(range.pick(samples, |_| None)),
        }
    }
}

struct SelectRange {
    start_ms: u64,
    end_ms: u64,
    driver: Option<DriverNumber>,
}

impl SelectRange {
    fn pick<T, F>(&self, samples: &[T], subject: F) -> Vec<T>
    where
        T: Timestamped + Clone,
        F: Fn(&T) -> Option<DriverNumber>,
    {
        samples
            .iter()
            .filter(|sample| {
                let at = sample.timestamp_ms();
                at >= self.start_ms && at < self.end_ms
            })
            .filter(|sample| match (self.driver, subject(sample)) {
                (Some(wanted), Some(actual)) => wanted == actual,
                (Some(_), None) | (None, _) => true,
            })
            .cloned()
            .collect()
    }
}
