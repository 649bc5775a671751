//! Accelerator and slime zone bookkeeping.
//!
//! Zones are trigger volumes the character can overlap several of at once.
//! [`ZoneTracker`] only remembers which ones are occupied and runs the
//! slime-exit restore lag; choosing the run speed is the coordinator's job.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Delay between leaving the last slime zone and restoring run speed (seconds).
pub const SLIME_EXIT_LAG: f32 = 0.2;

/// Identity of a trigger zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u64);

/// What a zone does to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Speeds the runner up and plays the slide animation.
    Accelerator,
    /// Slows the runner down.
    Slime,
}

/// Occupied zones and the pending slime-exit restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneTracker {
    accelerators: BTreeSet<ZoneId>,
    slimes: BTreeSet<ZoneId>,
    /// Seconds left before run speed is restored after leaving slime.
    slime_restore: Option<f32>,
}

impl ZoneTracker {
    /// Create a tracker with nothing occupied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entering `zone`. Returns `false` if it was already occupied.
    pub fn enter(&mut self, zone: ZoneId, kind: ZoneKind) -> bool {
        match kind {
            ZoneKind::Accelerator => self.accelerators.insert(zone),
            ZoneKind::Slime => self.slimes.insert(zone),
        }
    }

    /// Record leaving `zone`. Returns `false` if it was not occupied.
    pub fn exit(&mut self, zone: ZoneId, kind: ZoneKind) -> bool {
        match kind {
            ZoneKind::Accelerator => self.accelerators.remove(&zone),
            ZoneKind::Slime => self.slimes.remove(&zone),
        }
    }

    /// Whether any accelerator is occupied.
    pub fn in_accelerator(&self) -> bool {
        !self.accelerators.is_empty()
    }

    /// Whether any slime zone is occupied.
    pub fn in_slime(&self) -> bool {
        !self.slimes.is_empty()
    }

    /// Occupied accelerators, in id order.
    pub fn accelerators(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.accelerators.iter().copied()
    }

    /// Occupied slime zones, in id order.
    pub fn slimes(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.slimes.iter().copied()
    }

    /// Start (or restart) the slime-exit lag.
    pub fn arm_slime_restore(&mut self) {
        self.slime_restore = Some(SLIME_EXIT_LAG);
    }

    /// Drop a pending slime-exit restore.
    pub fn cancel_slime_restore(&mut self) {
        self.slime_restore = None;
    }

    /// Whether a slime-exit restore is pending.
    pub fn slime_restore_pending(&self) -> bool {
        self.slime_restore.is_some()
    }

    /// Count the restore lag down by `dt`.
    ///
    /// Returns `true` exactly once, on the call that exhausts the lag.
    pub fn advance_slime_restore(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.slime_restore.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.slime_restore = None;
            true
        } else {
            false
        }
    }

    /// Forget every occupied zone and any pending restore.
    pub fn clear(&mut self) {
        self.accelerators.clear();
        self.slimes.clear();
        self.slime_restore = None;
    }
}
