use std::time::{Duration, Instant};

use super::speed::PlaybackSpeed;

/// Elapsed wall-clock time below which a tick does nothing.
pub const DEFAULT_MIN_TICK: Duration = Duration::from_millis(32);

/// Result of driving the clock for one host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAdvance {
    /// Paused, first frame after resuming, or too soon since the last tick.
    Held,
    Advanced,
    /// Virtual time hit the session end and playback paused.
    ReachedEnd,
}

/// Virtual session time, decoupled from wall-clock time by the speed
/// multiplier.
#[derive(Debug, Clone)]
pub struct SessionClock {
    start_ms: u64,
    end_ms: u64,
    current_ms: u64,
    playing: bool,
    speed: PlaybackSpeed,
    min_tick: Duration,
    last_tick: Option<Instant>,
    /// Virtual microseconds below one millisecond left over by the last
    /// advance.
    carry_us: u128,
}

impl SessionClock {
    #[must_use]
    pub const fn new(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms,
            current_ms: start_ms,
            playing: false,
            speed: PlaybackSpeed::X1,
            min_tick: DEFAULT_MIN_TICK,
            last_tick: None,
            carry_us: 0,
        }
    }

    #[must_use]
    pub const fn with_min_tick(mut self, min_tick: Duration) -> Self {
        self.min_tick = min_tick;
        self
    }

    #[must_use]
    pub const fn start_ms(&self) -> u64 {
        self.start_ms
    }

    #[must_use]
    pub const fn end_ms(&self) -> u64 {
        self.end_ms
    }

    #[must_use]
    pub const fn current_ms(&self) -> u64 {
        self.current_ms
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub const fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Starts playback unless the clock already sits at the session end.
    pub fn play(&mut self) -> bool {
        if self.playing || self.current_ms >= self.end_ms {
            return false;
        }
        self.playing = true;
        self.last_tick = None;
        self.carry_us = 0;
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.playing = false;
        self.last_tick = None;
        self.carry_us = 0;
        true
    }

    pub const fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Moves virtual time to `target_ms`, clamped into the session bounds.
    pub fn seek(&mut self, target_ms: u64) -> u64 {
        self.current_ms = target_ms.clamp(self.start_ms, self.end_ms);
        self.carry_us = 0;
        self.current_ms
    }

    /// Host-frame entry point.
    ///
    /// Measures the wall-clock time since the last processed tick and
    /// advances when it reaches the minimum tick. Skipped frames keep the
    /// previous reference point so their time is not lost.
    pub fn tick(&mut self, now: Instant) -> ClockAdvance {
        if !self.playing {
            return ClockAdvance::Held;
        }
        let Some(last_tick) = self.last_tick else {
            self.last_tick = Some(now);
            return ClockAdvance::Held;
        };
        let elapsed = now.saturating_duration_since(last_tick);
        if elapsed < self.min_tick {
            return ClockAdvance::Held;
        }
        self.last_tick = Some(now);
        self.advance(elapsed)
    }

    /// Advances virtual time by `elapsed * speed`, pausing at the session end.
    ///
    /// Sub-millisecond remainders accumulate across calls, so many short
    /// frames add up to the same virtual time as one long one.
    pub fn advance(&mut self, elapsed: Duration) -> ClockAdvance {
        if !self.playing {
            return ClockAdvance::Held;
        }
        let scaled_micros = elapsed
            .as_micros()
            .saturating_mul(u128::from(self.speed.multiplier()))
            .saturating_add(self.carry_us);
        self.carry_us = scaled_micros.checked_rem(1000).unwrap_or(0);
        let advance_ms = u64::try_from(scaled_micros.checked_div(1000).unwrap_or(0))
            .unwrap_or(u64::MAX);
        self.current_ms = self.current_ms.saturating_add(advance_ms).min(self.end_ms);
        if self.current_ms >= self.end_ms {
            self.current_ms = self.end_ms;
            self.playing = false;
            self.last_tick = None;
            self.carry_us = 0;
            return ClockAdvance::ReachedEnd;
        }
        ClockAdvance::Advanced
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{ClockAdvance, SessionClock};
    use crate::replay::PlaybackSpeed;

    #[test]
    fn speed_ten_reaches_end_after_twenty_ticks_and_pauses() {
        let mut clock = SessionClock::new(0, 10_000);
        clock.set_speed(PlaybackSpeed::X10);
        assert!(clock.play());

        assert_eq!(clock.advance(Duration::from_millis(50)), ClockAdvance::Advanced);
        assert_eq!(clock.current_ms(), 500);

        let mut last = ClockAdvance::Advanced;
        for _ in 1..20 {
            last = clock.advance(Duration::from_millis(50));
        }
        assert_eq!(last, ClockAdvance::ReachedEnd);
        assert_eq!(clock.current_ms(), 10_000);
        assert!(!clock.is_playing());
    }

    #[test]
    fn never_overshoots_session_end() {
        let mut clock = SessionClock::new(1000, 2000);
        clock.set_speed(PlaybackSpeed::X50);
        clock.play();
        assert_eq!(clock.advance(Duration::from_secs(60)), ClockAdvance::ReachedEnd);
        assert_eq!(clock.current_ms(), 2000);
        assert!(!clock.play());
    }

    #[test]
    fn short_frames_are_coalesced() {
        let origin = Instant::now();
        let mut clock = SessionClock::new(0, 100_000);
        clock.play();

        assert_eq!(clock.tick(origin), ClockAdvance::Held);
        assert_eq!(clock.tick(origin + Duration::from_millis(16)), ClockAdvance::Held);
        assert_eq!(clock.current_ms(), 0);
        // The skipped frame's time is carried into the next processed tick.
        assert_eq!(
            clock.tick(origin + Duration::from_millis(40)),
            ClockAdvance::Advanced
        );
        assert_eq!(clock.current_ms(), 40);
    }

    #[test]
    fn sub_millisecond_remainders_accumulate() {
        let mut clock = SessionClock::new(0, 100_000);
        clock.play();
        for _ in 0..1000 {
            clock.advance(Duration::from_micros(33_333));
        }
        assert_eq!(clock.current_ms(), 33_333);

        clock.set_speed(PlaybackSpeed::X2);
        clock.advance(Duration::from_micros(250));
        clock.advance(Duration::from_micros(250));
        assert_eq!(clock.current_ms(), 33_334);
    }

    #[test]
    fn seek_drops_the_pending_remainder() {
        let mut clock = SessionClock::new(0, 100_000);
        clock.play();
        clock.advance(Duration::from_micros(900));
        assert_eq!(clock.current_ms(), 0);
        clock.seek(5000);
        clock.advance(Duration::from_micros(900));
        assert_eq!(clock.current_ms(), 5000);
    }

    #[test]
    fn paused_clock_does_not_move() {
        let origin = Instant::now();
        let mut clock = SessionClock::new(0, 100_000);
        assert_eq!(clock.tick(origin), ClockAdvance::Held);
        assert_eq!(clock.advance(Duration::from_secs(1)), ClockAdvance::Held);
        assert_eq!(clock.current_ms(), 0);
    }

    #[test]
    fn resuming_discards_time_spent_paused() {
        let origin = Instant::now();
        let mut clock = SessionClock::new(0, 100_000);
        clock.play();
        clock.tick(origin);
        clock.tick(origin + Duration::from_millis(100));
        assert_eq!(clock.current_ms(), 100);

        clock.pause();
        clock.play();
        clock.tick(origin + Duration::from_secs(10));
        clock.tick(origin + Duration::from_millis(10_050));
        assert_eq!(clock.current_ms(), 150);
    }

    #[test]
    fn seek_clamps_into_session() {
        let mut clock = SessionClock::new(1000, 5000);
        assert_eq!(clock.seek(0), 1000);
        assert_eq!(clock.seek(9000), 5000);
        assert_eq!(clock.seek(2500), 2500);
    }
}
