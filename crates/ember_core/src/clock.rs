//! # Frame Clock
//!
//! Fixed-timestep accumulator turning wall-clock frame time into a whole
//! number of simulation ticks.
//!
//! ## Design
//!
//! - Every tick advances the simulation by the same `fixed_dt`
//! - Leftover time carries over to the next frame
//! - A frame never runs more than `max_steps_per_frame` ticks; any backlog
//!   beyond that is dropped so a slow frame cannot snowball

use std::time::Duration;

use crate::config::{ClockConfig, MAX_TICK_RATE};

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum tick duration observed, in microseconds.
    pub min_tick_us: u64,
    /// Maximum tick duration observed, in microseconds.
    pub max_tick_us: u64,
    /// Rolling average tick duration, in microseconds.
    pub avg_tick_us: u64,
    /// Ticks that took longer than `fixed_dt`.
    pub late_ticks: u64,
    /// Ticks measured.
    pub total_ticks: u64,
    /// Frames that hit the step cap and dropped backlog.
    pub dropped_frames: u64,
}

impl TickStats {
    fn new(tick_duration: Duration) -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: duration_us(tick_duration),
            late_ticks: 0,
            total_ticks: 0,
            dropped_frames: 0,
        }
    }
}

/// Saturating conversion to whole microseconds.
fn duration_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Fixed-timestep clock.
#[derive(Clone, Debug)]
pub struct FrameClock {
    /// Duration of one tick.
    tick_duration: Duration,
    /// Time not yet consumed by a tick.
    accumulator: Duration,
    /// Cap on ticks per `advance` call.
    max_steps_per_frame: u32,
    /// Ticks handed out so far.
    tick_count: u64,
    /// Timing statistics.
    stats: TickStats,
}

impl FrameClock {
    /// Creates a clock from a validated configuration.
    ///
    /// `tick_rate` is clamped to `1..=MAX_TICK_RATE`, so a tick never lasts
    /// less than a nanosecond. A zero step cap is treated as 1.
    #[must_use]
    pub fn new(config: &ClockConfig) -> Self {
        let tick_rate = u64::from(config.tick_rate.clamp(1, MAX_TICK_RATE));
        let tick_duration = Duration::from_nanos(1_000_000_000 / tick_rate);

        Self {
            tick_duration,
            accumulator: Duration::ZERO,
            max_steps_per_frame: config.max_steps_per_frame.max(1),
            tick_count: 0,
            stats: TickStats::new(tick_duration),
        }
    }

    /// Adds `elapsed` wall-clock time and returns how many ticks are due.
    ///
    /// The caller runs exactly that many ticks.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.tick_duration && steps < self.max_steps_per_frame {
            self.accumulator -= self.tick_duration;
            steps += 1;
        }

        if self.accumulator >= self.tick_duration {
            self.stats.dropped_frames += 1;
            tracing::debug!(
                "Dropping {:?} of tick backlog after {} steps",
                self.accumulator,
                steps
            );
            self.accumulator = Duration::from_nanos(
                u64::try_from(self.accumulator.as_nanos() % self.tick_duration.as_nanos())
                    .unwrap_or(0),
            );
        }

        self.tick_count += u64::from(steps);
        steps
    }

    /// Records how long one tick took.
    pub fn record_tick(&mut self, duration: Duration) {
        let duration_us = duration_us(duration);

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);

        // Rolling average
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            self.stats.late_ticks += 1;
        }
    }

    /// Duration of one tick in seconds, as passed to systems.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.tick_duration.as_secs_f32()
    }

    /// Duration of one tick.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Ticks handed out by [`advance`](Self::advance) so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time carried over to the next frame.
    #[must_use]
    pub const fn backlog(&self) -> Duration {
        self.accumulator
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}
