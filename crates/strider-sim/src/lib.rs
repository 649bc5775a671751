//! Strider Sim -- Kinematic movement core for an endless-runner character.
//!
//! This crate owns the player's kinematic state and advances it in two
//! separate cadences:
//!
//! - a fixed-rate physics tick ([`Simulation::integrate_physics`]) that
//!   recomputes ground contact, applies gravity, and resolves edge slides;
//! - a variable-rate frame tick ([`Simulation::integrate_horizontal`] plus
//!   [`Simulation::advance_pre_jump`]) that translates the character and polls
//!   the pre-jump buffer.
//!
//! Discrete actions (jump, roll, run-speed selection, obstacle knockdown,
//! restart teleport) are plain method calls. The crate has no notion of events
//! or game state; the coordinator in `strider-control` drives it.
//!
//! All spatial queries go through a [`MotionBackend`], so the same simulation
//! runs against a real collision world or a [`ScriptedBackend`] in tests.
//!
//! # Quick Start
//!
//! ```
//! use strider_sim::prelude::*;
//!
//! let mut backend = ScriptedBackend::new(Vec3::ZERO);
//! backend.set_ground(true);
//!
//! let mut sim = Simulation::initialize(SimulationConfig::default(), backend).unwrap();
//! sim.integrate_physics(1.0 / 60.0);
//! assert!(sim.is_grounded());
//! assert_eq!(sim.velocity_y(), RESTING_VELOCITY);
//!
//! sim.jump();
//! assert_eq!(sim.velocity_y(), sim.jump_velocity());
//! ```

#![deny(unsafe_code)]

pub mod backend;
pub mod config;
pub mod jump;
pub mod math;
pub mod simulation;
pub mod state;

pub use backend::{MotionBackend, ScriptedBackend};
pub use config::SimulationConfig;
pub use jump::{PreJumpBuffer, PreJumpOutcome};
pub use math::Vec3;
pub use simulation::Simulation;
pub use state::{EdgeSupport, KinematicState};

/// Vertical velocity held while the character rests on the ground.
///
/// Deliberately non-zero: the downward bias keeps the ground overlap query
/// from flickering when the character sits exactly on a surface. The same
/// value doubles as the "already landed" marker when deciding whether to
/// snapshot the landing velocity.
pub const RESTING_VELOCITY: f32 = -1.0;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while configuring or initializing a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A configuration field holds a value the integrator cannot work with.
    #[error("invalid simulation config: '{field}' {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// A JSON configuration document could not be parsed.
    #[error("failed to parse simulation config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::backend::{MotionBackend, ScriptedBackend};
    pub use crate::config::SimulationConfig;
    pub use crate::jump::{PreJumpBuffer, PreJumpOutcome};
    pub use crate::math::Vec3;
    pub use crate::simulation::Simulation;
    pub use crate::state::{EdgeSupport, KinematicState};
    pub use crate::{SimError, RESTING_VELOCITY};
}
