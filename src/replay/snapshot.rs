use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::buffers::SessionBuffers;
use crate::telemetry::{
    CarDataSample, DriverNumber, Gap, LocationSample, RaceControlMessage, TeamRadioClip,
    WeatherSample,
};
use crate::timeline::{Timestamped, index_at_or_before, interpolate_at, latest_at_or_before};

/// One row of the classification at the snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub driver_number: DriverNumber,
    pub position: Option<u32>,
    pub gap_to_leader: Option<Gap>,
    pub interval: Option<Gap>,
}

/// Everything the presentation layer draws for one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub time_ms: u64,
    pub current_lap: Option<u32>,
    pub total_laps: Option<u32>,
    /// Interpolated track positions, ordered by driver number.
    pub cars: Vec<LocationSample>,
    pub focus: Option<CarDataSample>,
    pub standings: Vec<Standing>,
    pub weather: Option<WeatherSample>,
    pub race_control: Vec<RaceControlMessage>,
    pub team_radio: Vec<TeamRadioClip>,
}

impl Snapshot {
    #[must_use]
    pub fn car(&self, driver_number: DriverNumber) -> Option<&LocationSample> {
        self.cars
            .iter()
            .find(|car| car.driver_number == driver_number)
    }

    #[must_use]
    pub fn standing(&self, driver_number: DriverNumber) -> Option<&Standing> {
        self.standings
            .iter()
            .find(|standing| standing.driver_number == driver_number)
    }
}

/// Builds snapshots from buffered data. Pure: reads buffers, never fetches.
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'buf> {
    buffers: &'buf SessionBuffers,
    roster: &'buf BTreeSet<DriverNumber>,
    scan_depth: usize,
}

impl<'buf> Materializer<'buf> {
    /// `roster` lists the drivers standings wait for before the backward
    /// scan stops early. An empty roster falls back to the drivers with a
    /// buffered location stream.
    #[must_use]
    pub const fn new(
        buffers: &'buf SessionBuffers,
        roster: &'buf BTreeSet<DriverNumber>,
        scan_depth: usize,
    ) -> Self {
        Self {
            buffers,
            roster,
            scan_depth,
        }
    }

    #[must_use]
    pub fn materialize(&self, t: u64, focus: Option<DriverNumber>) -> Snapshot {
        Snapshot {
            time_ms: t,
            current_lap: self.current_lap(t),
            total_laps: None,
            cars: self.cars(t),
            focus: self.focus(t, focus),
            standings: self.standings(t),
            weather: latest_at_or_before(self.buffers.weather(), t).cloned(),
            race_control: revealed(self.buffers.race_control(), t),
            team_radio: revealed(self.buffers.team_radio(), t),
        }
    }

    fn cars(&self, t: u64) -> Vec<LocationSample> {
        self.buffers
            .locations()
            .streams()
            .filter_map(|(_, samples)| interpolate_at(samples, t))
            .collect()
    }

    fn focus(&self, t: u64, focus: Option<DriverNumber>) -> Option<CarDataSample> {
        let driver_number = focus?;
        interpolate_at(self.buffers.car_data(), t)
            .filter(|sample| sample.driver_number == driver_number)
    }

    /// Highest lap started by anyone at or before `t`, i.e. the leader's lap.
    fn current_lap(&self, t: u64) -> Option<u32> {
        let laps = self.buffers.laps();
        let last = index_at_or_before(laps, t, Timestamped::timestamp_ms)?;
        laps.get(..=last)?
            .iter()
            .rev()
            .take(self.scan_depth.max(1))
            .map(|lap| lap.lap_number)
            .max()
    }

    fn standings(&self, t: u64) -> Vec<Standing> {
        let fallback: BTreeSet<DriverNumber>;
        let roster = if self.roster.is_empty() {
            fallback = self.buffers.locations().subjects().collect();
            &fallback
        } else {
            self.roster
        };
        let positions = latest_per_driver(
            self.buffers.positions(),
            t,
            roster,
            self.scan_depth,
            |sample| sample.driver_number,
        );
        let intervals = latest_per_driver(
            self.buffers.intervals(),
            t,
            roster,
            self.scan_depth,
            |sample| sample.driver_number,
        );

        let drivers: BTreeSet<DriverNumber> =
            positions.keys().chain(intervals.keys()).copied().collect();
        let mut standings: Vec<Standing> = drivers
            .into_iter()
            .map(|driver_number| {
                let interval = intervals.get(&driver_number);
                Standing {
                    driver_number,
                    position: positions.get(&driver_number).map(|sample| sample.position),
                    gap_to_leader: interval.and_then(|sample| sample.gap_to_leader.clone()),
                    interval: interval.and_then(|sample| sample.interval.clone()),
                }
            })
            .collect();
        standings.sort_by_key(|standing| {
            (
                standing.position.is_none(),
                standing.position,
                standing.driver_number,
            )
        });
        standings
    }
}

/// Scans backward from the last sample at or before `t`, keeping the newest
/// sample per driver. Stops once every roster driver was seen or after
/// `depth` samples.
pub fn latest_per_driver<'s, T, F>(
    samples: &'s [T],
    t: u64,
    roster: &BTreeSet<DriverNumber>,
    depth: usize,
    driver: F,
) -> BTreeMap<DriverNumber, &'s T>
where
    T: Timestamped,
    F: Fn(&T) -> DriverNumber,
{
    let mut latest = BTreeMap::new();
    let Some(head) = index_at_or_before(samples, t, Timestamped::timestamp_ms)
        .and_then(|last| samples.get(..=last))
    else {
        return latest;
    };
    for sample in head.iter().rev().take(depth) {
        latest.entry(driver(sample)).or_insert(sample);
        if !roster.is_empty()
            && latest.len() >= roster.len()
            && roster.iter().all(|number| latest.contains_key(number))
        {
            break;
        }
    }
    latest
}

/// Every sample at or before `t`, oldest first.
fn revealed<T: Timestamped + Clone>(samples: &[T], t: u64) -> Vec<T> {
    index_at_or_before(samples, t, Timestamped::timestamp_ms)
        .and_then(|last| samples.get(..=last))
        .map_or_else(Vec::new, <[T]>::to_vec)
}
