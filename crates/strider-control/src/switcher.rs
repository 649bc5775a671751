//! Per-frame subsystem enablement.
//!
//! A disabled subsystem is skipped by the scheduler: its frame and fixed
//! ticks do not run. Event delivery is unaffected, which is how a paused
//! coordinator still hears `GameResumed`.
//!
//! [`Switchboard`] stages toggles and applies them on [`Switchboard::commit`].
//! The scheduler commits once per frame before running any ticks, so a toggle
//! requested while handling an event takes effect on the next tick, never in
//! the middle of one.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identity of a schedulable subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubsystemId(pub u32);

impl SubsystemId {
    /// Player input polling (jump / roll presses).
    pub const INPUT: SubsystemId = SubsystemId(0);
    /// The control coordinator's frame and fixed ticks.
    pub const PLAYER_LOGIC: SubsystemId = SubsystemId(1);
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SubsystemId::INPUT => f.write_str("input"),
            SubsystemId::PLAYER_LOGIC => f.write_str("player_logic"),
            SubsystemId(n) => write!(f, "subsystem#{n}"),
        }
    }
}

/// Enables and disables per-frame ticking of subsystems.
pub trait SubsystemSwitcher {
    /// Request that `id` run each frame.
    fn enable(&mut self, id: SubsystemId);

    /// Request that `id` stop running each frame.
    fn disable(&mut self, id: SubsystemId);

    /// Whether `id` currently runs each frame.
    fn is_enabled(&self, id: SubsystemId) -> bool;
}

/// A staged enablement change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    Enable(SubsystemId),
    Disable(SubsystemId),
}

impl Toggle {
    /// The subsystem this toggle applies to.
    pub fn id(self) -> SubsystemId {
        match self {
            Toggle::Enable(id) | Toggle::Disable(id) => id,
        }
    }
}

/// Committed enablement plus a FIFO of staged toggles.
///
/// Subsystems are enabled until something disables them. At most one toggle
/// per subsystem is staged: a new request replaces the earlier one, so the
/// queue stays bounded even if nothing commits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Switchboard {
    disabled: BTreeSet<SubsystemId>,
    staged: Vec<Toggle>,
}

impl Switchboard {
    /// Create a switchboard with every subsystem enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply staged toggles in request order. Returns how many were applied.
    pub fn commit(&mut self) -> usize {
        let applied = self.staged.len();
        for toggle in self.staged.drain(..) {
            match toggle {
                Toggle::Enable(id) => {
                    self.disabled.remove(&id);
                }
                Toggle::Disable(id) => {
                    self.disabled.insert(id);
                }
            }
        }
        if applied > 0 {
            debug!(applied, disabled = ?self.disabled, "subsystem toggles committed");
        }
        applied
    }

    /// Toggles waiting for the next commit.
    pub fn staged(&self) -> &[Toggle] {
        &self.staged
    }

    fn stage(&mut self, toggle: Toggle) {
        self.staged.retain(|staged| staged.id() != toggle.id());
        self.staged.push(toggle);
    }
}

impl SubsystemSwitcher for Switchboard {
    fn enable(&mut self, id: SubsystemId) {
        self.stage(Toggle::Enable(id));
    }

    fn disable(&mut self, id: SubsystemId) {
        self.stage(Toggle::Disable(id));
    }

    fn is_enabled(&self, id: SubsystemId) -> bool {
        !self.disabled.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_subsystems_are_enabled() {
        let board = Switchboard::new();
        assert!(board.is_enabled(SubsystemId(42)));
    }

    #[test]
    fn toggles_apply_only_on_commit() {
        let mut board = Switchboard::new();
        board.disable(SubsystemId::INPUT);
        assert!(board.is_enabled(SubsystemId::INPUT));
        assert_eq!(board.staged(), &[Toggle::Disable(SubsystemId::INPUT)]);

        assert_eq!(board.commit(), 1);
        assert!(!board.is_enabled(SubsystemId::INPUT));
        assert!(board.staged().is_empty());
    }

    #[test]
    fn last_staged_toggle_wins() {
        let mut board = Switchboard::new();
        board.disable(SubsystemId::PLAYER_LOGIC);
        board.enable(SubsystemId::PLAYER_LOGIC);
        board.disable(SubsystemId::PLAYER_LOGIC);
        board.commit();
        assert!(!board.is_enabled(SubsystemId::PLAYER_LOGIC));

        board.disable(SubsystemId::PLAYER_LOGIC);
        board.enable(SubsystemId::PLAYER_LOGIC);
        board.commit();
        assert!(board.is_enabled(SubsystemId::PLAYER_LOGIC));
    }

    #[test]
    fn repeated_toggles_collapse_per_subsystem() {
        let mut board = Switchboard::new();
        for _ in 0..100 {
            board.disable(SubsystemId::INPUT);
            board.enable(SubsystemId::PLAYER_LOGIC);
            board.enable(SubsystemId::INPUT);
        }
        assert_eq!(
            board.staged(),
            &[
                Toggle::Enable(SubsystemId::PLAYER_LOGIC),
                Toggle::Enable(SubsystemId::INPUT),
            ]
        );

        assert_eq!(board.commit(), 2);
        assert!(board.is_enabled(SubsystemId::INPUT));
        assert!(board.is_enabled(SubsystemId::PLAYER_LOGIC));
    }

    #[test]
    fn ids_display_by_name() {
        assert_eq!(SubsystemId::INPUT.to_string(), "input");
        assert_eq!(SubsystemId::PLAYER_LOGIC.to_string(), "player_logic");
        assert_eq!(SubsystemId(9).to_string(), "subsystem#9");
    }
}
