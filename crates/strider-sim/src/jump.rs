//! Pre-jump buffer.
//!
//! A jump pressed shortly before landing should still fire. When the player
//! presses jump while airborne the buffer is armed; every frame tick polls it
//! with the current ground state until the character lands (the jump fires)
//! or the window runs out (the press is dropped).

use serde::{Deserialize, Serialize};

/// Default window during which an early jump press is honoured (seconds).
pub const DEFAULT_PRE_JUMP_DURATION: f32 = 0.15;

/// What a single [`PreJumpBuffer::poll`] resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreJumpOutcome {
    /// Nothing is buffered.
    Idle,
    /// Still airborne and inside the window.
    Waiting,
    /// The character landed inside the window; the jump should fire now.
    Jumped,
    /// The window ran out before landing; the press was dropped.
    Expired,
}

/// Countdown that holds an early jump press until landing.
///
/// Only one wait is tracked. Arming while a wait is pending restarts the
/// window rather than stacking a second wait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreJumpBuffer {
    /// Whether a press is being held.
    pending: bool,
    /// Time spent waiting since the press (seconds).
    elapsed: f32,
    /// Length of the window (seconds).
    window: f32,
}

impl Default for PreJumpBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_PRE_JUMP_DURATION)
    }
}

impl PreJumpBuffer {
    /// Create an idle buffer with the given window.
    pub fn new(window: f32) -> Self {
        Self {
            pending: false,
            elapsed: 0.0,
            window,
        }
    }

    /// Start (or restart) waiting for a landing.
    pub fn arm(&mut self) {
        self.pending = true;
        self.elapsed = 0.0;
    }

    /// Drop any held press.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.elapsed = 0.0;
    }

    /// Advance the wait by `dt` and check for a landing.
    ///
    /// The elapsed time is advanced before the ground check, so a landing on
    /// the frame that exhausts the window still fires.
    pub fn poll(&mut self, dt: f32, grounded: bool) -> PreJumpOutcome {
        if !self.pending {
            return PreJumpOutcome::Idle;
        }

        self.elapsed += dt;

        if grounded {
            self.cancel();
            PreJumpOutcome::Jumped
        } else if self.elapsed >= self.window {
            self.cancel();
            PreJumpOutcome::Expired
        } else {
            PreJumpOutcome::Waiting
        }
    }

    /// Whether a press is being held.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Time spent waiting on the current press (seconds).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Length of the window (seconds).
    pub fn window(&self) -> f32 {
        self.window
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn idle_buffer_stays_idle() {
        let mut buffer = PreJumpBuffer::default();
        assert_eq!(buffer.poll(FRAME, true), PreJumpOutcome::Idle);
        assert!(!buffer.is_pending());
    }

    #[test]
    fn landing_inside_window_fires() {
        let mut buffer = PreJumpBuffer::new(0.15);
        buffer.arm();

        for _ in 0..3 {
            assert_eq!(buffer.poll(FRAME, false), PreJumpOutcome::Waiting);
        }
        assert_eq!(buffer.poll(FRAME, true), PreJumpOutcome::Jumped);
        assert!(!buffer.is_pending());

        // The press is consumed.
        assert_eq!(buffer.poll(FRAME, true), PreJumpOutcome::Idle);
    }

    #[test]
    fn window_expiry_drops_press() {
        // 1/32 s frames keep the accumulated time exact.
        let frame = 0.031_25;
        let mut buffer = PreJumpBuffer::new(0.1);
        buffer.arm();

        let mut outcome = PreJumpOutcome::Waiting;
        let mut polls = 0;
        while outcome == PreJumpOutcome::Waiting {
            outcome = buffer.poll(frame, false);
            polls += 1;
        }
        assert_eq!(outcome, PreJumpOutcome::Expired);
        assert_eq!(polls, 4, "0.1s window expires on the fourth 1/32s frame");

        // Landing afterwards does not fire the stale press.
        assert_eq!(buffer.poll(FRAME, true), PreJumpOutcome::Idle);
    }

    #[test]
    fn landing_on_last_frame_still_fires() {
        let mut buffer = PreJumpBuffer::new(0.1);
        buffer.arm();
        assert_eq!(buffer.poll(0.05, false), PreJumpOutcome::Waiting);
        assert_eq!(buffer.poll(0.05, true), PreJumpOutcome::Jumped);
    }

    #[test]
    fn rearming_restarts_window() {
        let mut buffer = PreJumpBuffer::new(0.1);
        buffer.arm();
        buffer.poll(0.08, false);
        assert!((buffer.elapsed() - 0.08).abs() < 1e-6);

        buffer.arm();
        assert_eq!(buffer.elapsed(), 0.0);
        assert_eq!(buffer.poll(0.08, false), PreJumpOutcome::Waiting);
    }

    #[test]
    fn zero_window_expires_on_first_airborne_poll() {
        let mut buffer = PreJumpBuffer::new(0.0);
        buffer.arm();
        assert_eq!(buffer.poll(FRAME, false), PreJumpOutcome::Expired);
    }

    #[test]
    fn cancel_clears_press() {
        let mut buffer = PreJumpBuffer::default();
        buffer.arm();
        buffer.cancel();
        assert!(!buffer.is_pending());
        assert_eq!(buffer.poll(FRAME, true), PreJumpOutcome::Idle);
    }
}
