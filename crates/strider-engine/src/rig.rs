//! Composition root: event bus, coordinator and frame clock.
//!
//! A [`RunnerRig`] drives one runner. Each call to [`RunnerRig::advance`]:
//!
//! 1. Dispatches queued events to the coordinator, in emission order.
//! 2. Commits subsystem toggles requested while handling them.
//! 3. If player logic is enabled, runs the frame tick and then every fixed
//!    tick the clock says is due.
//!
//! The frame tick runs before the fixed ticks. A jump applied while handling
//! input, or fired by the pre-jump buffer, may still overlap the ground box
//! when the physics tick runs; the simulation keeps upward velocity on the
//! ground, so the takeoff survives at any frame rate.

use serde::{Deserialize, Serialize};
use strider_control::{
    AnimationController, BreakableRegistry, Coordinator, EventBus, RunnerEvent, Switchboard,
};
use strider_sim::MotionBackend;
use tracing::trace;

use crate::tick::{FrameClock, TickConfig};

/// The coordinator type a rig drives.
pub type RigCoordinator<B, A, R> = Coordinator<B, A, R, Switchboard>;

/// What one [`RunnerRig::advance`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Event deliveries made during dispatch.
    pub delivered: usize,
    /// Whether player logic ran this frame.
    pub ticked: bool,
    /// Fixed ticks run this frame.
    pub fixed_steps: u32,
}

/// Owns the bus, the coordinator and the clock for one runner.
#[derive(Debug)]
pub struct RunnerRig<B, A, R> {
    bus: EventBus,
    coordinator: RigCoordinator<B, A, R>,
    clock: FrameClock,
}

impl<B, A, R> RunnerRig<B, A, R>
where
    B: MotionBackend,
    A: AnimationController,
    R: BreakableRegistry,
{
    /// Wire `coordinator` to a fresh bus and clock.
    ///
    /// Toggles staged by the coordinator's start-up step are committed here,
    /// so the rig starts with input and player logic disabled.
    ///
    /// # Panics
    ///
    /// Panics if `tick_config` is invalid (see [`FrameClock::new`]).
    pub fn new(mut coordinator: RigCoordinator<B, A, R>, tick_config: TickConfig) -> Self {
        let mut bus = EventBus::new();
        coordinator.add_listeners(&mut bus);
        coordinator.switcher_mut().commit();
        Self {
            bus,
            coordinator,
            clock: FrameClock::new(tick_config),
        }
    }

    /// Queue an event for the next frame.
    pub fn emit(&mut self, event: RunnerEvent) {
        self.bus.emit(event);
    }

    /// Queue a jump press if input is enabled. Returns whether it was queued.
    pub fn press_jump(&mut self) -> bool {
        self.press(RunnerEvent::JumpPressed)
    }

    /// Queue a roll press if input is enabled. Returns whether it was queued.
    pub fn press_roll(&mut self) -> bool {
        self.press(RunnerEvent::RollPressed)
    }

    fn press(&mut self, event: RunnerEvent) -> bool {
        if !self.coordinator.input_enabled() {
            trace!(?event, "input disabled; press ignored");
            return false;
        }
        self.bus.emit(event);
        true
    }

    /// Run one frame of `frame_dt` seconds.
    pub fn advance(&mut self, frame_dt: f32) -> FrameReport {
        let delivered = self.bus.dispatch(&mut [&mut self.coordinator]);
        self.coordinator.switcher_mut().commit();

        if !self.coordinator.is_enabled() {
            return FrameReport {
                delivered,
                ..Default::default()
            };
        }

        let fixed_steps = self.clock.advance(frame_dt);
        self.coordinator.frame_tick(frame_dt);
        let fixed_dt = self.clock.fixed_dt();
        for _ in 0..fixed_steps {
            self.coordinator.fixed_tick(fixed_dt);
        }

        FrameReport {
            delivered,
            ticked: true,
            fixed_steps,
        }
    }

    /// Run `frames` frames of `frame_dt` seconds each.
    pub fn run_frames(&mut self, frames: u32, frame_dt: f32) {
        for _ in 0..frames {
            self.advance(frame_dt);
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn coordinator(&self) -> &RigCoordinator<B, A, R> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut RigCoordinator<B, A, R> {
        &mut self.coordinator
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub(crate) fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
