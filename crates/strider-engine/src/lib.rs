//! Strider Engine -- Runner rig with frame clock, rapier2d backend and replay.
//!
//! This crate wires `strider-sim` and `strider-control` into something a game
//! loop can drive: a [`RunnerRig`](rig::RunnerRig) that owns the event bus,
//! the coordinator and a fixed-timestep [`FrameClock`](tick::FrameClock), a
//! rapier2d-backed [`MotionBackend`](strider_sim::MotionBackend), and
//! BLAKE3-hashed snapshots with deterministic replay.
//!
//! # Quick Start
//!
//! ```
//! use strider_control::prelude::*;
//! use strider_engine::prelude::*;
//! use strider_sim::{SimulationConfig, Vec3};
//!
//! let mut backend = RapierBackend::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.125, 0.4, 0.0));
//! backend.add_platform(Vec3::new(20.0, -0.5, 0.0), Vec3::new(25.0, 0.5, 0.0));
//!
//! let coordinator = CoordinatorBuilder::new()
//!     .simulate(SimulationConfig::default(), backend)
//!     .unwrap()
//!     .animation(CueRecorder::new())
//!     .breakables(BreakableSet::new())
//!     .switcher(Switchboard::new())
//!     .build()
//!     .unwrap();
//! let mut rig = RunnerRig::new(coordinator, TickConfig::default());
//!
//! rig.emit(RunnerEvent::GameStart);
//! rig.run_frames(120, 1.0 / 60.0);
//!
//! let sim = rig.coordinator().simulation();
//! assert!(sim.is_grounded());
//! assert!(sim.position().x > 1.0);
//! ```

#![deny(unsafe_code)]

pub mod physics;
pub mod replay;
pub mod rig;
pub mod snapshot;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the simulation crate for convenience.
pub use strider_sim;

/// Re-export the control crate for convenience.
pub use strider_control;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use crate::physics::{RapierBackend, SOLID, TRIGGERS};
    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::rig::{FrameReport, RigCoordinator, RunnerRig};
    pub use crate::snapshot::RigSnapshot;
    pub use crate::tick::{ClockState, FrameClock, TickConfig};
}
