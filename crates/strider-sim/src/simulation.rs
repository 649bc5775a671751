//! The kinematic integrator and its discrete actions.
//!
//! [`Simulation`] is deterministic given the same backend answers and the same
//! sequence of calls. It runs on two clocks:
//!
//! 1. [`integrate_physics`](Simulation::integrate_physics) on the fixed step:
//!    ground check, downward resting clamp or gravity, edge slide.
//! 2. [`integrate_horizontal`](Simulation::integrate_horizontal) and
//!    [`advance_pre_jump`](Simulation::advance_pre_jump) on the variable frame
//!    step: swept translation by `velocity * dt` and the pre-jump poll.
//!
//! Splitting the two keeps visual motion smooth at any frame rate while ground
//! and gravity stay on a fixed cadence.

use tracing::{debug, trace};

use crate::backend::MotionBackend;
use crate::config::SimulationConfig;
use crate::jump::{PreJumpBuffer, PreJumpOutcome};
use crate::math::Vec3;
use crate::state::{EdgeSupport, KinematicState};
use crate::{SimError, RESTING_VELOCITY};

/// Kinematic simulation of the runner over a [`MotionBackend`].
#[derive(Debug)]
pub struct Simulation<B> {
    config: SimulationConfig,
    backend: B,
    state: KinematicState,
    pre_jump: PreJumpBuffer,
    /// Cached `config.gravity`.
    gravity: f32,
    /// Takeoff speed derived from jump height and gravity.
    jump_velocity: f32,
}

impl<B: MotionBackend> Simulation<B> {
    /// Validate `config` and set up the simulation at the backend's current
    /// position.
    ///
    /// The current position becomes the start position used by
    /// [`move_to_start_position`](Self::move_to_start_position). Vertical
    /// velocity starts at the resting bias so the first ground check sees a
    /// settled character.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if the configuration is unusable.
    pub fn initialize(config: SimulationConfig, backend: B) -> Result<Self, SimError> {
        config.validate()?;

        let gravity = config.gravity;
        let jump_velocity = config.jump_velocity();
        let start_position = backend.position();
        let pre_jump = PreJumpBuffer::new(config.pre_jump_duration);

        debug!(
            gravity,
            jump_velocity,
            start_x = start_position.x,
            start_y = start_position.y,
            "simulation initialized"
        );

        Ok(Self {
            config,
            backend,
            state: KinematicState::new(start_position),
            pre_jump,
            gravity,
            jump_velocity,
        })
    }

    // -- per-tick integration -----------------------------------------------

    /// Fixed-step update: ground contact, vertical velocity and edge slide.
    ///
    /// On the ground, downward velocity is clamped to [`RESTING_VELOCITY`].
    /// Upward velocity from a jump applied since the last tick is kept, so the
    /// takeoff survives a tick that still finds ground under the feet.
    pub fn integrate_physics(&mut self, dt: f32) {
        debug_assert!(dt >= 0.0 && dt.is_finite(), "dt must be non-negative, got {dt}");

        let position = self.backend.position();
        self.state.is_grounded = self
            .backend
            .overlap_box(position, self.config.ground_box_half_extents);

        if self.state.is_grounded {
            // Exact compare on purpose: the resting value marks "already landed".
            if self.state.velocity.y != RESTING_VELOCITY {
                self.state.velocity_y_before_grounded = self.state.velocity.y;
                trace!(
                    landing_velocity = self.state.velocity_y_before_grounded,
                    "landed"
                );
            }
            // Only downward motion is clamped; a takeoff keeps its velocity.
            if self.state.velocity.y < RESTING_VELOCITY {
                self.state.velocity.y = RESTING_VELOCITY;
            }
        } else {
            self.state.velocity_y_before_grounded = 0.0;
            self.state.velocity.y =
                (self.state.velocity.y + self.gravity * dt).clamp(self.gravity, -self.gravity);
            self.slide_from_edge(dt);
        }
    }

    /// Frame-step update: sweep the character by `velocity * dt`.
    pub fn integrate_horizontal(&mut self, dt: f32) {
        debug_assert!(dt >= 0.0 && dt.is_finite(), "dt must be non-negative, got {dt}");
        self.backend.translate(self.state.velocity * dt);
    }

    /// Frame-step poll of a buffered early jump press.
    ///
    /// Applies the takeoff velocity if the character is grounded while a press
    /// is held; drops the press once the window runs out.
    pub fn advance_pre_jump(&mut self, dt: f32) -> PreJumpOutcome {
        let outcome = self.pre_jump.poll(dt, self.state.is_grounded);
        match outcome {
            PreJumpOutcome::Jumped => {
                debug!("buffered jump fired on landing");
                self.apply_jump();
            }
            PreJumpOutcome::Expired => debug!("buffered jump expired before landing"),
            PreJumpOutcome::Idle | PreJumpOutcome::Waiting => {}
        }
        outcome
    }

    // -- discrete actions ---------------------------------------------------

    /// Jump now if grounded, otherwise hold the press until landing.
    pub fn jump(&mut self) {
        if self.state.is_grounded {
            self.apply_jump();
        } else {
            debug!(window = self.pre_jump.window(), "jump pressed airborne, buffering");
            self.pre_jump.arm();
        }
    }

    /// Slam downward to cut a jump short. No effect on the ground.
    pub fn roll(&mut self) {
        if !self.state.is_grounded {
            self.state.velocity.y = -self.jump_velocity;
        }
    }

    /// Run at normal speed.
    pub fn run_forward(&mut self) {
        self.state.velocity.x = self.config.run_speed;
    }

    /// Run at the reduced slime speed.
    pub fn run_on_slime(&mut self) {
        self.state.velocity.x = self.config.run_speed_slow;
    }

    /// Run at the boosted accelerator speed.
    pub fn run_on_accelerator(&mut self) {
        self.state.velocity.x = self.config.run_speed_fast;
    }

    /// Stop forward motion.
    pub fn run_stop(&mut self) {
        self.state.velocity.x = 0.0;
    }

    /// Stumble: stop and knock the character slightly downward.
    pub fn hit_by_obstacle(&mut self) {
        self.run_stop();
        self.state.velocity.y = -self.jump_velocity * self.config.obstacle_knockdown_factor;
    }

    /// Teleport back to the start position with the resting bias restored.
    ///
    /// Swept translation is switched off around the placement so the
    /// controller does not resolve the jump against the old location.
    pub fn move_to_start_position(&mut self) {
        self.state.velocity = Vec3::DOWN;
        self.pre_jump.cancel();

        self.backend.set_translation_enabled(false);
        self.backend.set_position(self.state.start_position);
        self.backend.set_translation_enabled(true);

        debug!(
            x = self.state.start_position.x,
            y = self.state.start_position.y,
            "moved to start position"
        );
    }

    /// Forget the last landing velocity.
    pub fn reset_velocity_before_grounded(&mut self) {
        self.state.velocity_y_before_grounded = 0.0;
    }

    /// Reinstate a previously captured state and pre-jump buffer.
    ///
    /// The start position fixed at initialization is kept; the captured one
    /// is ignored. The backend position is not touched; callers restoring a
    /// snapshot place the character separately.
    pub fn restore(&mut self, state: KinematicState, pre_jump: PreJumpBuffer) {
        self.state = KinematicState {
            start_position: self.state.start_position,
            ..state
        };
        self.pre_jump = pre_jump;
    }

    // -- accessors ----------------------------------------------------------

    /// The current kinematic state.
    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Whether the last physics tick found ground.
    pub fn is_grounded(&self) -> bool {
        self.state.is_grounded
    }

    /// Current vertical velocity.
    pub fn velocity_y(&self) -> f32 {
        self.state.velocity.y
    }

    /// Current velocity.
    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    /// Vertical velocity captured at the last landing.
    pub fn velocity_y_before_grounded(&self) -> f32 {
        self.state.velocity_y_before_grounded
    }

    /// Takeoff speed of a jump.
    pub fn jump_velocity(&self) -> f32 {
        self.jump_velocity
    }

    /// Position reported by the backend.
    pub fn position(&self) -> Vec3 {
        self.backend.position()
    }

    /// The pre-jump buffer.
    pub fn pre_jump(&self) -> &PreJumpBuffer {
        &self.pre_jump
    }

    /// The configuration this simulation was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    ///
    /// Use for level setup and tests; gameplay should go through the
    /// simulation's actions.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // -- internals ----------------------------------------------------------

    fn apply_jump(&mut self) {
        self.state.velocity.y = self.jump_velocity;
    }

    /// Probe both edges and nudge the character off a ledge it is half on.
    fn slide_from_edge(&mut self, dt: f32) {
        let position = self.backend.position();
        let front = self.backend.raycast_down(
            position + self.config.front_probe_offset,
            self.config.front_probe_reach(),
        );
        let back = self.backend.raycast_down(
            position + self.config.back_probe_offset,
            self.config.back_probe_reach(),
        );

        let support = EdgeSupport::from_probes(front, back);
        let direction = support.slide_direction();
        if direction != 0.0 {
            let mut slid = position;
            slid.x += direction * self.config.edge_slide_speed * dt;
            self.backend.set_position(slid);
            trace!(?support, x = slid.x, "edge slide");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
