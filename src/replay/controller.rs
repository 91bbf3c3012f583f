use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::buffers::SessionBuffers;
use super::clock::{ClockAdvance, SessionClock};
use super::config::{ReplayConfig, duration_ms};
use super::prefetch::{FetchPlan, Prefetcher};
use super::snapshot::{Materializer, Snapshot};
use super::speed::PlaybackSpeed;
use crate::error::{AppError, AppResult, ValidationError};
use crate::source::DataSource;
use crate::telemetry::{DriverNumber, SessionInfo, StreamGroup};

/// All mutable replay state of one loaded session.
///
/// Built when a session loads and dropped when it changes; dropping aborts
/// any fetch still in flight. Every method runs on the caller's thread and
/// returns without waiting on the network: fetches complete in the
/// background and are merged on a later [`tick`](Self::tick).
pub struct ReplayController {
    session: SessionInfo,
    config: ReplayConfig,
    clock: SessionClock,
    buffers: SessionBuffers,
    prefetcher: Prefetcher,
    roster: BTreeSet<DriverNumber>,
    focus: Option<DriverNumber>,
    snapshot: Snapshot,
}

impl ReplayController {
    /// Loads session metadata from `source` and builds a controller at the
    /// session start.
    ///
    /// # Errors
    ///
    /// Returns an error when the session cannot be loaded or its bounds are
    /// inverted.
    pub async fn load(
        source: Arc<dyn DataSource>,
        session_key: u32,
        config: ReplayConfig,
    ) -> AppResult<Self> {
        let session = source.session_info(session_key).await?;
        Self::new(source, session, config)
    }

    /// Builds a controller for an already loaded session and issues the
    /// initial fetches when a Tokio runtime is available.
    ///
    /// # Errors
    ///
    /// Returns an error when the session ends before it starts.
    pub fn new(
        source: Arc<dyn DataSource>,
        session: SessionInfo,
        config: ReplayConfig,
    ) -> AppResult<Self> {
        if session.end_ms < session.start_ms {
            return Err(AppError::validation(ValidationError::SessionBoundsInverted {
                start_ms: session.start_ms,
                end_ms: session.end_ms,
            }));
        }
        tracing::info!(
            "Loaded session {} '{}' ({} driver(s), {} ms).",
            session.session_key,
            session.session_name,
            session.drivers.len(),
            session.duration_ms()
        );
        let clock = SessionClock::new(session.start_ms, session.end_ms).with_min_tick(config.min_tick);
        let roster = session
            .drivers
            .iter()
            .map(|driver| driver.driver_number)
            .collect();
        let mut controller = Self {
            prefetcher: Prefetcher::new(source, session.session_key),
            buffers: SessionBuffers::new(session.start_ms),
            clock,
            roster,
            focus: None,
            snapshot: Snapshot::default(),
            session,
            config,
        };
        controller.refresh();
        controller.ensure_prefetch();
        Ok(controller)
    }

    #[must_use]
    pub const fn session(&self) -> &SessionInfo {
        &self.session
    }

    #[must_use]
    pub const fn config(&self) -> &ReplayConfig {
        &self.config
    }

    #[must_use]
    pub const fn buffers(&self) -> &SessionBuffers {
        &self.buffers
    }

    #[must_use]
    pub const fn current_ms(&self) -> u64 {
        self.clock.current_ms()
    }

    /// Offset of the play head from the session start.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.clock.current_ms().saturating_sub(self.session.start_ms)
    }

    #[must_use]
    pub const fn current_lap(&self) -> Option<u32> {
        self.snapshot.current_lap
    }

    #[must_use]
    pub const fn total_laps(&self) -> Option<u32> {
        self.session.total_laps
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    #[must_use]
    pub const fn speed(&self) -> PlaybackSpeed {
        self.clock.speed()
    }

    #[must_use]
    pub const fn focus(&self) -> Option<DriverNumber> {
        self.focus
    }

    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn has_pending_fetches(&self) -> bool {
        self.prefetcher.has_in_flight()
    }

    pub fn play(&mut self) -> bool {
        self.clock.play()
    }

    pub fn pause(&mut self) -> bool {
        self.clock.pause()
    }

    /// Flips between playing and paused; returns whether playback runs.
    pub fn toggle(&mut self) -> bool {
        if self.clock.is_playing() {
            self.clock.pause();
        } else {
            self.clock.play();
        }
        self.clock.is_playing()
    }

    /// Takes effect on the next tick.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        if speed != self.clock.speed() {
            tracing::debug!("Playback speed set to {}.", speed);
        }
        self.clock.set_speed(speed);
    }

    pub fn cycle_speed(&mut self, faster: bool) -> PlaybackSpeed {
        let current = self.clock.speed();
        let next = if faster {
            current.faster()
        } else {
            current.slower()
        };
        self.set_speed(next);
        next
    }

    /// Moves the play head to `target_ms`, clamped into the session, and
    /// rebuilds the snapshot before returning.
    ///
    /// Buffers are kept when the target is still covered and lies within
    /// the retention margin behind the play head. Otherwise every buffer is
    /// discarded and refilled from the target.
    pub fn seek(&mut self, target_ms: u64) -> u64 {
        let previous_ms = self.clock.current_ms();
        let target_ms = self.clock.seek(target_ms);
        let shared = self.buffers.shared_window();
        let keep_shared = shared.contains(target_ms)
            && previous_ms.saturating_sub(target_ms) <= self.config.retention_ms();
        if keep_shared {
            if !self.buffers.focus_window().contains(target_ms) {
                self.invalidate_focus(target_ms);
            }
        } else {
            tracing::debug!("Seek to {} outside buffered range; refetching.", target_ms);
            self.prefetcher.invalidate(StreamGroup::Shared);
            self.buffers.reset_shared(target_ms);
            self.invalidate_focus(target_ms);
        }
        self.refresh();
        self.ensure_prefetch();
        target_ms
    }

    /// Seeks relative to the current time.
    pub fn step(&mut self, delta: Duration, forward: bool) -> u64 {
        let current = self.clock.current_ms();
        let delta_ms = duration_ms(delta);
        let target = if forward {
            current.saturating_add(delta_ms)
        } else {
            current.saturating_sub(delta_ms)
        };
        self.seek(target)
    }

    /// Switches the driver whose car telemetry is shown.
    ///
    /// Only the focus buffer is dropped; shared streams, including the
    /// previous focus driver's position, stay as they are.
    pub fn select_focus(&mut self, driver_number: Option<DriverNumber>) {
        if driver_number == self.focus {
            return;
        }
        self.focus = driver_number;
        let now_ms = self.clock.current_ms();
        self.invalidate_focus(now_ms);
        if let Some(number) = driver_number {
            tracing::debug!("Focus switched to driver {}.", number);
            let end_ms = self.fetch_end(now_ms, self.config.focus_chunk_ms());
            self.issue(StreamGroup::Focus, now_ms, end_ms);
        }
        self.refresh();
    }

    /// Selects the next or previous driver in roster order, wrapping
    /// through "no focus".
    pub fn cycle_focus(&mut self, forward: bool) -> Option<DriverNumber> {
        let drivers = self.driver_order();
        let position = self
            .focus
            .and_then(|current| drivers.iter().position(|number| *number == current));
        let next_idx = match (position, forward) {
            (None, true) => Some(0),
            (None, false) => drivers.len().checked_sub(1),
            (Some(idx), true) => idx.checked_add(1).filter(|next| *next < drivers.len()),
            (Some(idx), false) => idx.checked_sub(1),
        };
        let next = next_idx.and_then(|idx| drivers.get(idx).copied());
        self.select_focus(next);
        next
    }

    /// Host-frame entry point: merges completed fetches, advances the clock,
    /// rebuilds the snapshot, then checks whether more data is needed.
    pub fn tick(&mut self, now: Instant) -> ClockAdvance {
        let merged = self.merge_finished();
        let advance = self.clock.tick(now);
        self.after_advance(advance, merged);
        advance
    }

    /// Same pipeline as [`tick`](Self::tick) with an explicit wall-clock
    /// delta.
    pub fn advance(&mut self, elapsed: Duration) -> ClockAdvance {
        let merged = self.merge_finished();
        let advance = self.clock.advance(elapsed);
        self.after_advance(advance, merged);
        advance
    }

    /// Waits for every outstanding fetch, merges the results, and rebuilds
    /// the snapshot. Issues no new fetches.
    pub async fn settle(&mut self) {
        while self.prefetcher.has_in_flight() {
            if let Some(outcome) = self.prefetcher.next_finished().await {
                self.prefetcher.apply(&mut self.buffers, outcome);
            }
        }
        self.refresh();
    }

    fn after_advance(&mut self, advance: ClockAdvance, merged: bool) {
        if advance == ClockAdvance::ReachedEnd {
            tracing::info!("Reached session end; playback paused.");
        }
        if merged || advance != ClockAdvance::Held {
            self.trim();
            self.refresh();
        }
        self.ensure_prefetch();
    }

    fn merge_finished(&mut self) -> bool {
        let mut merged = false;
        for outcome in self.prefetcher.collect_finished() {
            merged |= self.prefetcher.apply(&mut self.buffers, outcome);
        }
        merged
    }

    fn refresh(&mut self) {
        let materializer = Materializer::new(
            &self.buffers,
            &self.roster,
            self.config.standings_scan_depth,
        );
        let mut snapshot = materializer.materialize(self.clock.current_ms(), self.focus);
        snapshot.total_laps = self.session.total_laps;
        self.snapshot = snapshot;
    }

    fn trim(&mut self) {
        let cut_ms = self
            .clock
            .current_ms()
            .saturating_sub(self.config.retention_ms());
        if cut_ms <= self.session.start_ms {
            return;
        }
        let removed = self.buffers.trim_dense(cut_ms);
        if removed > 0 {
            tracing::debug!("Trimmed {} sample(s) older than {}.", removed, cut_ms);
        }
    }

    fn ensure_prefetch(&mut self) {
        let groups: &[StreamGroup] = if self.focus.is_some() {
            &[StreamGroup::Shared, StreamGroup::Focus]
        } else {
            &[StreamGroup::Shared]
        };
        let current_ms = self.clock.current_ms();
        let speed = self.clock.speed();
        for group in groups {
            if !self.prefetcher.is_idle(*group) {
                continue;
            }
            let until_ms = self.buffers.window(*group).until_ms;
            if until_ms > current_ms && !self.config.needs_fetch(until_ms, current_ms, speed) {
                continue;
            }
            let end_ms = self.fetch_end(until_ms, self.config.chunk_ms(speed));
            self.issue(*group, until_ms, end_ms);
        }
    }

    /// Fetch end for a range starting at `start_ms`, capped just past the
    /// session end so samples stamped exactly at the end are included.
    fn fetch_end(&self, start_ms: u64, chunk_ms: u64) -> u64 {
        start_ms
            .saturating_add(chunk_ms)
            .min(self.session.end_ms.saturating_add(1))
    }

    fn issue(&mut self, group: StreamGroup, start_ms: u64, end_ms: u64) {
        if start_ms >= end_ms {
            return;
        }
        let history_from_ms = (group == StreamGroup::Shared && self.buffers.history_pending())
            .then_some(self.session.start_ms);
        let driver_number = match group {
            StreamGroup::Shared => None,
            StreamGroup::Focus => self.focus,
        };
        self.prefetcher.issue(FetchPlan {
            group,
            generation: self.prefetcher.generation(group),
            start_ms,
            end_ms,
            history_from_ms,
            driver_number,
        });
    }

    fn invalidate_focus(&mut self, anchor_ms: u64) {
        self.prefetcher.invalidate(StreamGroup::Focus);
        self.buffers.reset_focus(anchor_ms);
    }

    fn driver_order(&self) -> Vec<DriverNumber> {
        if self.session.drivers.is_empty() {
            self.buffers.locations().subjects().collect()
        } else {
            self.session
                .drivers
                .iter()
                .map(|driver| driver.driver_number)
                .collect()
        }
    }
}
