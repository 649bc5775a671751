//! Kinematic state and edge-support classification.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::RESTING_VELOCITY;

/// The character's kinematic state, owned by [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// `x` is forward speed, `y` is vertical velocity, `z` is unused.
    pub velocity: Vec3,
    /// Result of the most recent ground overlap test.
    pub is_grounded: bool,
    /// Vertical velocity captured on the physics tick that detected landing.
    /// Zero while airborne.
    pub velocity_y_before_grounded: f32,
    /// Position recorded at initialization; restart teleports back here.
    pub start_position: Vec3,
}

impl KinematicState {
    /// Fresh state at `start_position`: resting downward bias, not grounded.
    pub fn new(start_position: Vec3) -> Self {
        Self {
            velocity: Vec3::new(0.0, RESTING_VELOCITY, 0.0),
            is_grounded: false,
            velocity_y_before_grounded: 0.0,
            start_position,
        }
    }
}

/// Which of the two edge probes found ground under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeSupport {
    /// Both probes hit ground: fully on a platform.
    Both,
    /// Only the probe ahead of the character hit ground.
    FrontOnly,
    /// Only the probe behind the character hit ground.
    BackOnly,
    /// Neither probe hit ground: clear of the ledge, free fall handles it.
    Neither,
}

impl EdgeSupport {
    /// Classify a pair of probe results.
    pub fn from_probes(front: bool, back: bool) -> Self {
        match (front, back) {
            (true, true) => EdgeSupport::Both,
            (true, false) => EdgeSupport::FrontOnly,
            (false, true) => EdgeSupport::BackOnly,
            (false, false) => EdgeSupport::Neither,
        }
    }

    /// Sign of the horizontal slide: away from the supported edge.
    ///
    /// `1.0` slides forward, `-1.0` backward, `0.0` means no correction.
    pub fn slide_direction(self) -> f32 {
        match self {
            EdgeSupport::BackOnly => 1.0,
            EdgeSupport::FrontOnly => -1.0,
            EdgeSupport::Both | EdgeSupport::Neither => 0.0,
        }
    }
}
