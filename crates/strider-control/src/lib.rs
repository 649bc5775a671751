//! Strider Control -- Event-driven coordinator for the runner character.
//!
//! Sits between the game's event stream and the kinematic simulation in
//! `strider-sim`. Events arrive through an [`EventBus`] owned by the
//! composition root; the [`Coordinator`] turns each one into simulation
//! actions, animation cues and subsystem toggles.
//!
//! Collaborators are traits so hosts can plug in their own:
//!
//! - [`AnimationController`] -- fire-and-forget animation cues
//!   ([`CueRecorder`] records them);
//! - [`SubsystemSwitcher`] -- per-frame enablement ([`Switchboard`] stages
//!   toggles until the scheduler commits them);
//! - [`BreakableRegistry`] -- "break on contact" lookup ([`BreakableSet`]).
//!
//! # Quick Start
//!
//! ```
//! use strider_control::prelude::*;
//! use strider_sim::{ScriptedBackend, SimulationConfig, Vec3};
//!
//! let mut bus = EventBus::new();
//! let mut coordinator = CoordinatorBuilder::new()
//!     .simulate(SimulationConfig::default(), ScriptedBackend::new(Vec3::ZERO))
//!     .unwrap()
//!     .animation(CueRecorder::new())
//!     .breakables(BreakableSet::new())
//!     .switcher(Switchboard::new())
//!     .build()
//!     .unwrap();
//! coordinator.add_listeners(&mut bus);
//!
//! bus.emit(RunnerEvent::GameStart);
//! bus.dispatch(&mut [&mut coordinator]);
//! coordinator.switcher_mut().commit();
//!
//! assert!(coordinator.is_enabled());
//! assert!(coordinator.flags().running);
//! ```

#![deny(unsafe_code)]

pub mod animation;
pub mod coordinator;
pub mod events;
pub mod fragile;
pub mod switcher;
pub mod zones;

pub use animation::{AnimationController, AnimationCue, CueRecorder};
pub use coordinator::{ControlState, Coordinator, CoordinatorBuilder, RunFlags};
pub use events::{EventBus, EventKind, EventListener, ListenerId, RunnerEvent};
pub use fragile::{BreakableRegistry, BreakableSet, ObjectId};
pub use switcher::{SubsystemId, SubsystemSwitcher, Switchboard, Toggle};
pub use zones::{ZoneId, ZoneKind, ZoneTracker, SLIME_EXIT_LAG};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while assembling a coordinator.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// A required collaborator was never supplied to the builder.
    #[error("coordinator is missing collaborator: {name}")]
    MissingCollaborator { name: &'static str },

    /// The simulation could not be initialized.
    #[error(transparent)]
    Sim(#[from] strider_sim::SimError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::animation::{AnimationController, AnimationCue, CueRecorder};
    pub use crate::coordinator::{ControlState, Coordinator, CoordinatorBuilder, RunFlags};
    pub use crate::events::{EventBus, EventKind, EventListener, ListenerId, RunnerEvent};
    pub use crate::fragile::{BreakableRegistry, BreakableSet, ObjectId};
    pub use crate::switcher::{SubsystemId, SubsystemSwitcher, Switchboard};
    pub use crate::zones::{ZoneId, ZoneKind, ZoneTracker};
    pub use crate::ControlError;
}
