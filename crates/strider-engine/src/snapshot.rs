//! Rig snapshot and restore with BLAKE3 hashing.
//!
//! [`RigSnapshot`] captures everything that affects how a [`RunnerRig`]
//! evolves: the kinematic state and character position, the pre-jump buffer,
//! the coordinator's control state, committed and staged subsystem toggles,
//! queued events, and the clock counters. A BLAKE3 digest of the serialized
//! state guards integrity and doubles as a determinism fingerprint.
//!
//! # Usage
//!
//! ```
//! use strider_control::prelude::*;
//! use strider_engine::prelude::*;
//! use strider_sim::{ScriptedBackend, SimulationConfig, Vec3};
//!
//! let mut backend = ScriptedBackend::new(Vec3::ZERO);
//! backend.set_ground(true);
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
//! rig.run_frames(10, 1.0 / 60.0);
//!
//! let snapshot = rig.capture_snapshot();
//! assert_eq!(snapshot.hash.len(), 64); // BLAKE3 hex digest
//!
//! rig.run_frames(10, 1.0 / 60.0);
//! rig.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(rig.state_hash(), snapshot.hash);
//! ```
//!
//! # What Is NOT Serialized
//!
//! - **Collaborators** -- the animation controller, breakable registry and
//!   collision geometry belong to the host and are left as they are.
//! - **Bus subscriptions** -- the coordinator stays subscribed on restore.
//! - **Simulation config** -- restore onto a rig built with the same config.
//!
//! The captured start position is informational: a restored rig keeps the
//! start position it was built with, so restart still returns there.

use serde::{Deserialize, Serialize};
use strider_control::{
    AnimationController, BreakableRegistry, ControlState, RunnerEvent, Switchboard,
};
use strider_sim::{KinematicState, MotionBackend, PreJumpBuffer, Vec3};
use tracing::debug;

use crate::rig::RunnerRig;
use crate::tick::ClockState;

// ---------------------------------------------------------------------------
// RigSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of a rig's simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigSnapshot {
    pub kinematic: KinematicState,
    /// Character position reported by the motion backend.
    pub position: Vec3,
    pub pre_jump: PreJumpBuffer,
    pub control: ControlState,
    pub switchboard: Switchboard,
    /// Events queued but not yet dispatched, in emission order.
    pub pending_events: Vec<RunnerEvent>,
    pub clock: ClockState,
    /// BLAKE3 hex digest (64 lowercase hex chars) of every field above.
    pub hash: String,
}

/// Borrowed view of the hashed fields, so capture and verification hash the
/// exact same layout.
#[derive(Serialize)]
struct HashableState<'a> {
    kinematic: &'a KinematicState,
    position: &'a Vec3,
    pre_jump: &'a PreJumpBuffer,
    control: &'a ControlState,
    switchboard: &'a Switchboard,
    pending_events: &'a [RunnerEvent],
    clock: &'a ClockState,
}

impl HashableState<'_> {
    fn digest(&self) -> String {
        let json_bytes = serde_json::to_vec(self)
            .expect("rig state should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

impl RigSnapshot {
    fn hashable(&self) -> HashableState<'_> {
        HashableState {
            kinematic: &self.kinematic,
            position: &self.position,
            pre_jump: &self.pre_jump,
            control: &self.control,
            switchboard: &self.switchboard,
            pending_events: &self.pending_events,
            clock: &self.clock,
        }
    }

    /// Recompute the digest from the snapshot's fields.
    pub fn compute_hash(&self) -> String {
        self.hashable().digest()
    }

    /// Whether the stored digest matches the snapshot's fields.
    pub fn verify(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON and check the digest.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or a digest mismatch.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let snapshot: RigSnapshot = serde_json::from_str(json)?;
        if !snapshot.verify() {
            anyhow::bail!(
                "snapshot hash mismatch: recorded {} but recomputed {}",
                snapshot.hash,
                snapshot.compute_hash()
            );
        }
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// RunnerRig snapshot/restore methods
// ---------------------------------------------------------------------------

impl<B, A, R> RunnerRig<B, A, R>
where
    B: MotionBackend,
    A: AnimationController,
    R: BreakableRegistry,
{
    /// Capture the rig's simulation state.
    pub fn capture_snapshot(&self) -> RigSnapshot {
        let sim = self.coordinator().simulation();
        let mut snapshot = RigSnapshot {
            kinematic: *sim.state(),
            position: sim.position(),
            pre_jump: *sim.pre_jump(),
            control: self.coordinator().control_state(),
            switchboard: self.coordinator().switcher().clone(),
            pending_events: self.bus().pending_events().copied().collect(),
            clock: self.clock().state(),
            hash: String::new(),
        };
        snapshot.hash = snapshot.compute_hash();
        snapshot
    }

    /// Restore state captured by [`capture_snapshot`](Self::capture_snapshot).
    ///
    /// The digest is verified before anything is touched; on error the rig is
    /// unchanged. The character is placed with swept translation disabled so
    /// the move does not collide with the level.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot's digest does not match its contents.
    pub fn restore_from_snapshot(&mut self, snapshot: &RigSnapshot) -> anyhow::Result<()> {
        let expected = snapshot.compute_hash();
        if expected != snapshot.hash {
            anyhow::bail!(
                "snapshot hash mismatch: recorded {} but recomputed {}. \
                 The snapshot may be corrupted or tampered with.",
                snapshot.hash,
                expected
            );
        }

        let coordinator = self.coordinator_mut();
        let sim = coordinator.simulation_mut();
        sim.restore(snapshot.kinematic, snapshot.pre_jump);
        let backend = sim.backend_mut();
        backend.set_translation_enabled(false);
        backend.set_position(snapshot.position);
        backend.set_translation_enabled(true);

        coordinator.restore_control_state(snapshot.control.clone());
        *coordinator.switcher_mut() = snapshot.switchboard.clone();

        let bus = self.bus_mut();
        bus.clear_pending();
        for event in &snapshot.pending_events {
            bus.emit(*event);
        }

        self.clock_mut().restore(snapshot.clock);

        debug!(hash = %snapshot.hash, "rig restored from snapshot");
        Ok(())
    }

    /// BLAKE3 digest of the current state without keeping the snapshot.
    pub fn state_hash(&self) -> String {
        self.capture_snapshot().hash
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
