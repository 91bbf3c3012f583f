use serde::{Deserialize, Serialize};

use crate::timeline::{Interpolate, Timestamped, lerp};

pub type DriverNumber = u32;

/// Car position on the track map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub timestamp_ms: u64,
    pub driver_number: DriverNumber,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// High-rate car dynamics for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDataSample {
    pub timestamp_ms: u64,
    pub driver_number: DriverNumber,
    pub speed: f64,
    pub rpm: f64,
    pub throttle: f64,
    pub brake: f64,
    pub gear: u8,
    pub drs: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSample {
    pub timestamp_ms: u64,
    pub driver_number: DriverNumber,
    pub position: u32,
}

/// Gap as reported by timing: seconds, or a text such as `+1 LAP`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gap {
    Seconds(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSample {
    pub timestamp_ms: u64,
    pub driver_number: DriverNumber,
    pub gap_to_leader: Option<Gap>,
    pub interval: Option<Gap>,
}

/// Lap start event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapSample {
    pub timestamp_ms: u64,
    pub driver_number: DriverNumber,
    pub lap_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceControlMessage {
    pub timestamp_ms: u64,
    pub category: String,
    pub message: String,
    pub flag: Option<String>,
    pub driver_number: Option<DriverNumber>,
    pub lap_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRadioClip {
    pub timestamp_ms: u64,
    pub driver_number: DriverNumber,
    pub recording_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp_ms: u64,
    pub air_temperature: f64,
    pub track_temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

impl Interpolate for LocationSample {
    fn blend(&self, next: &Self, ratio: f64, at_ms: u64) -> Self {
        Self {
            timestamp_ms: at_ms,
            driver_number: self.driver_number,
            x: lerp(self.x, next.x, ratio),
            y: lerp(self.y, next.y, ratio),
            z: lerp(self.z, next.z, ratio),
        }
    }
}

impl Interpolate for CarDataSample {
    fn blend(&self, next: &Self, ratio: f64, at_ms: u64) -> Self {
        Self {
            timestamp_ms: at_ms,
            driver_number: self.driver_number,
            speed: lerp(self.speed, next.speed, ratio),
            rpm: lerp(self.rpm, next.rpm, ratio),
            throttle: lerp(self.throttle, next.throttle, ratio),
            brake: lerp(self.brake, next.brake, ratio),
            gear: self.gear,
            drs: self.drs,
        }
    }
}

macro_rules! impl_timestamped {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Timestamped for $ty {
                fn timestamp_ms(&self) -> u64 {
                    self.timestamp_ms
                }
            }
        )+
    };
}

impl_timestamped!(
    LocationSample,
    CarDataSample,
    PositionSample,
    IntervalSample,
    LapSample,
    RaceControlMessage,
    TeamRadioClip,
    WeatherSample,
);
