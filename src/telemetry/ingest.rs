use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::batch::StreamBatch;
use super::kind::StreamKind;
use super::samples::{
    CarDataSample, DriverNumber, Gap, IntervalSample, LapSample, LocationSample, PositionSample,
    RaceControlMessage, TeamRadioClip, WeatherSample,
};

/// Timestamp layout used by sources that omit the UTC offset.
const NAIVE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// Timestamp layout used when building range queries.
const QUERY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[must_use]
pub fn parse_timestamp_ms(value: &str) -> Option<u64> {
    let trimmed = value.trim();
    let millis = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => parsed.timestamp_millis(),
        Err(_) => NaiveDateTime::parse_from_str(trimmed, NAIVE_DATE_FORMAT)
            .ok()?
            .and_utc()
            .timestamp_millis(),
    };
    u64::try_from(millis).ok()
}

#[must_use]
pub fn format_timestamp_ms(timestamp_ms: u64) -> Option<String> {
    let millis = i64::try_from(timestamp_ms).ok()?;
    let instant = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(instant.format(QUERY_DATE_FORMAT).to_string())
}

/// Converts raw source records into typed samples.
///
/// Records that fail to decode or lack a required field are dropped; the
/// second element of the result counts them.
#[must_use]
pub fn ingest_records(kind: StreamKind, records: Vec<Value>) -> (StreamBatch, usize) {
    let (batch, dropped) = match kind {
        StreamKind::Location => {
            let (samples, dropped) = convert::<RawLocation>(records);
            (StreamBatch::Location(samples), dropped)
        }
        StreamKind::CarData => {
            let (samples, dropped) = convert::<RawCarData>(records);
            (StreamBatch::CarData(samples), dropped)
        }
        StreamKind::Position => {
            let (samples, dropped) = convert::<RawPosition>(records);
            (StreamBatch::Position(samples), dropped)
        }
        StreamKind::Intervals => {
            let (samples, dropped) = convert::<RawInterval>(records);
            (StreamBatch::Intervals(samples), dropped)
        }
        StreamKind::Laps => {
            let (samples, dropped) = convert::<RawLap>(records);
            (StreamBatch::Laps(samples), dropped)
        }
        StreamKind::RaceControl => {
            let (samples, dropped) = convert::<RawRaceControl>(records);
            (StreamBatch::RaceControl(samples), dropped)
        }
        StreamKind::TeamRadio => {
            let (samples, dropped) = convert::<RawTeamRadio>(records);
            (StreamBatch::TeamRadio(samples), dropped)
        }
        StreamKind::Weather => {
            let (samples, dropped) = convert::<RawWeather>(records);
            (StreamBatch::Weather(samples), dropped)
        }
    };
    if dropped > 0 {
        tracing::debug!("Dropped {} malformed {} record(s).", dropped, kind);
    }
    (batch, dropped)
}

trait RawRecord: DeserializeOwned {
    type Sample;

    fn into_sample(self) -> Option<Self::Sample>;
}

fn convert<R: RawRecord>(records: Vec<Value>) -> (Vec<R::Sample>, usize) {
    let total = records.len();
    let samples: Vec<R::Sample> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value::<R>(record).ok())
        .filter_map(RawRecord::into_sample)
        .collect();
    let dropped = total.saturating_sub(samples.len());
    (samples, dropped)
}

fn timestamp(date: Option<&str>) -> Option<u64> {
    date.and_then(parse_timestamp_ms)
}

#[derive(Deserialize)]
struct RawLocation {
    date: Option<String>,
    driver_number: Option<DriverNumber>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl RawRecord for RawLocation {
    type Sample = LocationSample;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(LocationSample {
            timestamp_ms: timestamp(self.date.as_deref())?,
            driver_number: self.driver_number?,
            x: self.x?,
            y: self.y?,
            z: self.z.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct RawCarData {
    date: Option<String>,
    driver_number: Option<DriverNumber>,
    speed: Option<f64>,
    rpm: Option<f64>,
    throttle: Option<f64>,
    brake: Option<f64>,
    n_gear: Option<u8>,
    drs: Option<u8>,
}

impl RawRecord for RawCarData {
    type Sample = CarDataSample;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(CarDataSample {
            timestamp_ms: timestamp(self.date.as_deref())?,
            driver_number: self.driver_number?,
            speed: self.speed?,
            rpm: self.rpm.unwrap_or_default(),
            throttle: self.throttle.unwrap_or_default(),
            brake: self.brake.unwrap_or_default(),
            gear: self.n_gear.unwrap_or_default(),
            drs: self.drs.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct RawPosition {
    date: Option<String>,
    driver_number: Option<DriverNumber>,
    position: Option<u32>,
}

impl RawRecord for RawPosition {
    type Sample = PositionSample;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(PositionSample {
            timestamp_ms: timestamp(self.date.as_deref())?,
            driver_number: self.driver_number?,
            position: self.position?,
        })
    }
}

#[derive(Deserialize)]
struct RawInterval {
    date: Option<String>,
    driver_number: Option<DriverNumber>,
    #[serde(default)]
    gap_to_leader: Option<Gap>,
    #[serde(default)]
    interval: Option<Gap>,
}

impl RawRecord for RawInterval {
    type Sample = IntervalSample;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(IntervalSample {
            timestamp_ms: timestamp(self.date.as_deref())?,
            driver_number: self.driver_number?,
            gap_to_leader: self.gap_to_leader,
            interval: self.interval,
        })
    }
}

#[derive(Deserialize)]
struct RawLap {
    date_start: Option<String>,
    driver_number: Option<DriverNumber>,
    lap_number: Option<u32>,
}

impl RawRecord for RawLap {
    type Sample = LapSample;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(LapSample {
            timestamp_ms: timestamp(self.date_start.as_deref())?,
            driver_number: self.driver_number?,
            lap_number: self.lap_number?,
        })
    }
}

#[derive(Deserialize)]
struct RawRaceControl {
    date: Option<String>,
    category: Option<String>,
    message: Option<String>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    driver_number: Option<DriverNumber>,
    #[serde(default)]
    lap_number: Option<u32>,
}

impl RawRecord for RawRaceControl {
    type Sample = RaceControlMessage;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(RaceControlMessage {
            timestamp_ms: timestamp(self.date.as_deref())?,
            category: self.category.unwrap_or_else(|| "Other".to_owned()),
            message: self.message?,
            flag: self.flag,
            driver_number: self.driver_number,
            lap_number: self.lap_number,
        })
    }
}

#[derive(Deserialize)]
struct RawTeamRadio {
    date: Option<String>,
    driver_number: Option<DriverNumber>,
    recording_url: Option<String>,
}

impl RawRecord for RawTeamRadio {
    type Sample = TeamRadioClip;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(TeamRadioClip {
            timestamp_ms: timestamp(self.date.as_deref())?,
            driver_number: self.driver_number?,
            recording_url: self.recording_url?,
        })
    }
}

#[derive(Deserialize)]
struct RawWeather {
    date: Option<String>,
    air_temperature: Option<f64>,
    track_temperature: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    rainfall: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
}

impl RawRecord for RawWeather {
    type Sample = WeatherSample;

    fn into_sample(self) -> Option<Self::Sample> {
        Some(WeatherSample {
            timestamp_ms: timestamp(self.date.as_deref())?,
            air_temperature: self.air_temperature?,
            track_temperature: self.track_temperature?,
            humidity: self.humidity.unwrap_or_default(),
            pressure: self.pressure.unwrap_or_default(),
            rainfall: self.rainfall.unwrap_or_default(),
            wind_speed: self.wind_speed.unwrap_or_default(),
            wind_direction: self.wind_direction.unwrap_or_default(),
        })
    }
}
