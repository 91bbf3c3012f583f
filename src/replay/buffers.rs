use crate::telemetry::{
    CarDataSample, IntervalSample, LapSample, LocationSample, PositionSample, RaceControlMessage,
    StreamBatch, StreamGroup, TeamRadioClip, WeatherSample,
};
use crate::timeline::{BufferWindow, StreamBuffer, SubjectBuffers};

/// Every stream buffer of one loaded session.
///
/// The shared group is filled by combined fetches and always moves its
/// watermarks together; the focus group holds the focus driver's car data.
#[derive(Debug, Clone)]
pub struct SessionBuffers {
    locations: SubjectBuffers<LocationSample>,
    positions: StreamBuffer<PositionSample>,
    intervals: StreamBuffer<IntervalSample>,
    laps: StreamBuffer<LapSample>,
    race_control: StreamBuffer<RaceControlMessage>,
    team_radio: StreamBuffer<TeamRadioClip>,
    weather: StreamBuffer<WeatherSample>,
    car_data: StreamBuffer<CarDataSample>,
    history_pending: bool,
}

impl SessionBuffers {
    #[must_use]
    pub const fn new(anchor_ms: u64) -> Self {
        Self {
            locations: SubjectBuffers::new(anchor_ms),
            positions: StreamBuffer::new(anchor_ms),
            intervals: StreamBuffer::new(anchor_ms),
            laps: StreamBuffer::new(anchor_ms),
            race_control: StreamBuffer::new(anchor_ms),
            team_radio: StreamBuffer::new(anchor_ms),
            weather: StreamBuffer::new(anchor_ms),
            car_data: StreamBuffer::new(anchor_ms),
            history_pending: true,
        }
    }

    #[must_use]
    pub const fn locations(&self) -> &SubjectBuffers<LocationSample> {
        &self.locations
    }

    #[must_use]
    pub fn positions(&self) -> &[PositionSample] {
        self.positions.samples()
    }

    #[must_use]
    pub fn intervals(&self) -> &[IntervalSample] {
        self.intervals.samples()
    }

    #[must_use]
    pub fn laps(&self) -> &[LapSample] {
        self.laps.samples()
    }

    #[must_use]
    pub fn race_control(&self) -> &[RaceControlMessage] {
        self.race_control.samples()
    }

    #[must_use]
    pub fn team_radio(&self) -> &[TeamRadioClip] {
        self.team_radio.samples()
    }

    #[must_use]
    pub fn weather(&self) -> &[WeatherSample] {
        self.weather.samples()
    }

    #[must_use]
    pub fn car_data(&self) -> &[CarDataSample] {
        self.car_data.samples()
    }

    /// Range every shared stream holds completely.
    #[must_use]
    pub fn shared_window(&self) -> BufferWindow {
        [
            self.positions.window(),
            self.intervals.window(),
            self.laps.window(),
            self.race_control.window(),
            self.team_radio.window(),
            self.weather.window(),
        ]
        .iter()
        .fold(self.locations.window(), |acc, window| acc.intersect(window))
    }

    #[must_use]
    pub const fn focus_window(&self) -> BufferWindow {
        self.car_data.window()
    }

    #[must_use]
    pub fn window(&self, group: StreamGroup) -> BufferWindow {
        match group {
            StreamGroup::Shared => self.shared_window(),
            StreamGroup::Focus => self.focus_window(),
        }
    }

    /// Whether the next shared fetch must also pull history-keeping streams
    /// from the session start.
    #[must_use]
    pub const fn history_pending(&self) -> bool {
        self.history_pending
    }

    pub(crate) fn reset_shared(&mut self, anchor_ms: u64) {
        self.locations.reset(anchor_ms);
        self.positions.reset(anchor_ms);
        self.intervals.reset(anchor_ms);
        self.laps.reset(anchor_ms);
        self.race_control.reset(anchor_ms);
        self.team_radio.reset(anchor_ms);
        self.weather.reset(anchor_ms);
        self.history_pending = true;
    }

    pub(crate) fn reset_focus(&mut self, anchor_ms: u64) {
        self.car_data.reset(anchor_ms);
    }

    /// Merges one fetched batch covering up to `end_ms`.
    ///
    /// `history_from_ms` is set for history-keeping streams that were
    /// fetched from before the buffer anchor.
    pub(crate) fn merge(&mut self, batch: StreamBatch, end_ms: u64, history_from_ms: Option<u64>) {
        match batch {
            StreamBatch::Location(samples) => {
                self.locations
                    .merge(samples, end_ms, |sample| sample.driver_number);
            }
            StreamBatch::CarData(samples) => self.car_data.merge(samples, end_ms),
            StreamBatch::Position(samples) => {
                merge_history(&mut self.positions, samples, end_ms, history_from_ms);
            }
            StreamBatch::Intervals(samples) => self.intervals.merge(samples, end_ms),
            StreamBatch::Laps(samples) => {
                merge_history(&mut self.laps, samples, end_ms, history_from_ms);
            }
            StreamBatch::RaceControl(samples) => {
                merge_history(&mut self.race_control, samples, end_ms, history_from_ms);
            }
            StreamBatch::TeamRadio(samples) => {
                merge_history(&mut self.team_radio, samples, end_ms, history_from_ms);
            }
            StreamBatch::Weather(samples) => self.weather.merge(samples, end_ms),
        }
    }

    pub(crate) const fn mark_history_loaded(&mut self) {
        self.history_pending = false;
    }

    /// Drops dense samples older than `cut_ms`. History-keeping streams are
    /// left intact, and every driver keeps its last interval before the cut.
    pub(crate) fn trim_dense(&mut self, cut_ms: u64) -> usize {
        let shared = self
            .locations
            .trim_before(cut_ms)
            .saturating_add(
                self.intervals
                    .trim_before_per_subject(cut_ms, |sample| sample.driver_number),
            )
            .saturating_add(self.weather.trim_before(cut_ms));
        shared.saturating_add(self.car_data.trim_before(cut_ms))
    }
}

fn merge_history<T: crate::timeline::Timestamped>(
    buffer: &mut StreamBuffer<T>,
    samples: Vec<T>,
    end_ms: u64,
    history_from_ms: Option<u64>,
) {
    buffer.merge(samples, end_ms);
    if let Some(from_ms) = history_from_ms {
        buffer.extend_start(from_ms);
    }
}
