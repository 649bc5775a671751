//! Fixed-timestep frame clock.
//!
//! Frames arrive at whatever rate the host renders. Physics must run at a
//! fixed rate, so [`FrameClock`] accumulates frame time and hands out whole
//! fixed steps:
//!
//! 1. Each frame adds its `dt` to the accumulator.
//! 2. As many `fixed_dt` steps as fit are taken out, up to
//!    [`TickConfig::max_fixed_steps`].
//! 3. Backlog beyond the cap is dropped (with a warning) so one long stall
//!    cannot trigger a burst of catch-up ticks.
//!
//! Simulated time is `fixed_ticks * fixed_dt`, computed by multiplication
//! rather than accumulated, so it does not drift.
//!
//! # Example
//!
//! ```
//! use strider_engine::tick::{FrameClock, TickConfig};
//!
//! let mut clock = FrameClock::new(TickConfig {
//!     fixed_dt: 0.25,
//!     ..Default::default()
//! });
//!
//! assert_eq!(clock.advance(0.5), 2);
//! assert_eq!(clock.advance(0.125), 0);
//! assert_eq!(clock.advance(0.125), 1);
//! assert_eq!(clock.fixed_ticks(), 3);
//! assert_eq!(clock.sim_time(), 0.75);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-step clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    /// Fixed physics step in seconds. Must be positive and finite.
    pub fixed_dt: f32,
    /// Most fixed steps taken in a single frame. Must be at least 1.
    pub max_fixed_steps: u32,
}

impl Default for TickConfig {
    /// 60 Hz physics, at most 5 catch-up steps per frame.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_fixed_steps: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// FrameClock
// ---------------------------------------------------------------------------

/// Serializable counters of a [`FrameClock`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    /// Frame time not yet consumed by a fixed step.
    pub accumulator: f32,
    /// Fixed steps taken so far.
    pub fixed_ticks: u64,
    /// Frames advanced so far.
    pub frames: u64,
    /// Fixed steps discarded because of the per-frame cap.
    pub dropped_steps: u64,
}

/// Turns variable frame time into whole fixed steps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    config: TickConfig,
    state: ClockState,
}

impl FrameClock {
    /// Create a clock at time zero.
    ///
    /// # Panics
    ///
    /// Panics if `fixed_dt` is not positive and finite, or if
    /// `max_fixed_steps` is zero.
    pub fn new(config: TickConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        assert!(
            config.max_fixed_steps > 0,
            "max_fixed_steps must be at least 1"
        );
        Self {
            config,
            state: ClockState::default(),
        }
    }

    /// Add one frame's worth of time and return how many fixed steps are due.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        debug_assert!(
            frame_dt >= 0.0 && frame_dt.is_finite(),
            "frame_dt must be non-negative, got {frame_dt}"
        );

        let fixed_dt = self.config.fixed_dt;
        self.state.frames += 1;
        self.state.accumulator += frame_dt;

        let mut steps = 0;
        while self.state.accumulator >= fixed_dt && steps < self.config.max_fixed_steps {
            self.state.accumulator -= fixed_dt;
            steps += 1;
        }

        if self.state.accumulator >= fixed_dt {
            let dropped = (self.state.accumulator / fixed_dt) as u64;
            self.state.accumulator -= dropped as f32 * fixed_dt;
            self.state.dropped_steps += dropped;
            warn!(
                dropped,
                frame = self.state.frames,
                frame_dt,
                "fixed-step backlog exceeded cap; dropping steps"
            );
        }

        self.state.fixed_ticks += u64::from(steps);
        steps
    }

    /// Fixed step length in seconds.
    pub fn fixed_dt(&self) -> f32 {
        self.config.fixed_dt
    }

    /// Fixed steps taken so far.
    pub fn fixed_ticks(&self) -> u64 {
        self.state.fixed_ticks
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.state.frames
    }

    /// Simulated physics time in seconds: `fixed_ticks * fixed_dt`.
    pub fn sim_time(&self) -> f64 {
        self.state.fixed_ticks as f64 * f64::from(self.config.fixed_dt)
    }

    /// Frame time waiting for the next fixed step.
    pub fn accumulator(&self) -> f32 {
        self.state.accumulator
    }

    /// Fixed steps discarded by the per-frame cap.
    pub fn dropped_steps(&self) -> u64 {
        self.state.dropped_steps
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Capture the counters.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Reinstate captured counters.
    pub fn restore(&mut self, state: ClockState) {
        self.state = state;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter_clock(max_fixed_steps: u32) -> FrameClock {
        FrameClock::new(TickConfig {
            fixed_dt: 0.25,
            max_fixed_steps,
        })
    }

    #[test]
    fn frame_equal_to_fixed_dt_yields_one_step() {
        let mut clock = FrameClock::new(TickConfig::default());
        for _ in 0..120 {
            assert_eq!(clock.advance(1.0 / 60.0), 1);
        }
        assert_eq!(clock.fixed_ticks(), 120);
        assert_eq!(clock.frames(), 120);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut clock = quarter_clock(5);
        assert_eq!(clock.advance(0.125), 0);
        assert_eq!(clock.accumulator(), 0.125);
        assert_eq!(clock.advance(0.125), 1);
        assert_eq!(clock.accumulator(), 0.0);
    }

    #[test]
    fn backlog_beyond_cap_is_dropped() {
        let mut clock = quarter_clock(2);
        assert_eq!(clock.advance(2.0), 2);
        assert_eq!(clock.dropped_steps(), 6);
        assert_eq!(clock.accumulator(), 0.0);
        assert_eq!(clock.fixed_ticks(), 2);

        // The clock keeps working normally afterwards.
        assert_eq!(clock.advance(0.25), 1);
    }

    #[test]
    fn sim_time_is_ticks_times_dt() {
        let mut clock = quarter_clock(5);
        clock.advance(1.0);
        assert_eq!(clock.sim_time(), 1.0);
    }

    #[test]
    fn state_round_trips() {
        let mut clock = quarter_clock(5);
        clock.advance(0.6);
        let saved = clock.state();

        clock.advance(3.0);
        clock.restore(saved);
        assert_eq!(clock.state(), saved);
        assert_eq!(clock.fixed_ticks(), 2);
    }

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn zero_fixed_dt_panics() {
        FrameClock::new(TickConfig {
            fixed_dt: 0.0,
            ..Default::default()
        });
    }

    #[test]
    #[should_panic(expected = "max_fixed_steps")]
    fn zero_step_cap_panics() {
        quarter_clock(0);
    }
}
