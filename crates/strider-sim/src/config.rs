//! Tunable parameters for the kinematic integrator.
//!
//! [`SimulationConfig`] groups every constant the movement model reads. It is
//! serde-serializable so level designers can ship tuning as JSON; fields left
//! out of a document fall back to [`SimulationConfig::default`].

use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::SimError;

/// Configuration for the runner's movement model.
///
/// Units are world units and seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // ========================================================================
    // Physics
    // ========================================================================
    /// Vertical acceleration applied while airborne. Must be negative.
    pub gravity: f32,

    /// Apex height of a jump from rest, used to derive the takeoff speed.
    pub jump_height: f32,

    /// Fraction of the takeoff speed applied downward when hitting an obstacle.
    pub obstacle_knockdown_factor: f32,

    // ========================================================================
    // Run speeds
    // ========================================================================
    /// Normal forward speed.
    pub run_speed: f32,

    /// Forward speed while wading through slime.
    pub run_speed_slow: f32,

    /// Forward speed while riding an accelerator.
    pub run_speed_fast: f32,

    // ========================================================================
    // Timers
    // ========================================================================
    /// How long an early jump press waits for the character to land (seconds).
    pub pre_jump_duration: f32,

    // ========================================================================
    // Ground and edge probes
    // ========================================================================
    /// Horizontal speed at which the character slides off a ledge it is only
    /// half standing on.
    pub edge_slide_speed: f32,

    /// Extra reach added to each edge probe beyond its horizontal offset.
    pub probe_length: f32,

    /// Half extents of the box used for the ground overlap test, centered on
    /// the character position.
    pub ground_box_half_extents: Vec3,

    /// Origin of the front edge probe, relative to the character position.
    pub front_probe_offset: Vec3,

    /// Origin of the back edge probe, relative to the character position.
    pub back_probe_offset: Vec3,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let probe_length = 0.06;
        Self {
            gravity: -9.81,
            jump_height: 1.5,
            obstacle_knockdown_factor: 0.25,

            run_speed: 4.2,
            run_speed_slow: 2.0,
            run_speed_fast: 8.0,

            pre_jump_duration: 0.15,

            edge_slide_speed: 1.0,
            probe_length,
            ground_box_half_extents: Vec3::new(0.125, (probe_length + 0.04) / 2.0, 0.45),
            front_probe_offset: Vec3::new(0.2, 0.05, 0.0),
            back_probe_offset: Vec3::new(-0.2, 0.05, 0.0),
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document and validate the result.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigParse`] for malformed JSON and
    /// [`SimError::InvalidConfig`] if a value fails [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field holds a value the integrator can use.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SimError {
            SimError::InvalidConfig {
                field,
                reason: reason.into(),
            }
        }

        let scalars = [
            ("gravity", self.gravity),
            ("jump_height", self.jump_height),
            ("obstacle_knockdown_factor", self.obstacle_knockdown_factor),
            ("run_speed", self.run_speed),
            ("run_speed_slow", self.run_speed_slow),
            ("run_speed_fast", self.run_speed_fast),
            ("pre_jump_duration", self.pre_jump_duration),
            ("edge_slide_speed", self.edge_slide_speed),
            ("probe_length", self.probe_length),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }

        let vectors = [
            ("ground_box_half_extents", self.ground_box_half_extents),
            ("front_probe_offset", self.front_probe_offset),
            ("back_probe_offset", self.back_probe_offset),
        ];
        for (field, value) in vectors {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value:?}")));
            }
        }

        if self.gravity >= 0.0 {
            return Err(invalid(
                "gravity",
                format!("must be negative (pointing down), got {}", self.gravity),
            ));
        }

        let non_negative = [
            ("jump_height", self.jump_height),
            ("obstacle_knockdown_factor", self.obstacle_knockdown_factor),
            ("run_speed", self.run_speed),
            ("run_speed_slow", self.run_speed_slow),
            ("run_speed_fast", self.run_speed_fast),
            ("pre_jump_duration", self.pre_jump_duration),
            ("edge_slide_speed", self.edge_slide_speed),
            ("probe_length", self.probe_length),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(invalid(field, format!("must not be negative, got {value}")));
            }
        }

        let half = self.ground_box_half_extents;
        if half.x <= 0.0 || half.y <= 0.0 || half.z < 0.0 {
            return Err(invalid(
                "ground_box_half_extents",
                format!("must be positive on x and y, got {half:?}"),
            ));
        }

        Ok(())
    }

    /// Takeoff speed that reaches [`jump_height`](Self::jump_height) under
    /// [`gravity`](Self::gravity): `sqrt(h * -2 * g)`.
    pub fn jump_velocity(&self) -> f32 {
        (self.jump_height * -2.0 * self.gravity).sqrt()
    }

    /// Downward reach of the front edge probe.
    pub fn front_probe_reach(&self) -> f32 {
        self.front_probe_offset.x.abs() + self.probe_length
    }

    /// Downward reach of the back edge probe.
    pub fn back_probe_reach(&self) -> f32 {
        self.back_probe_offset.x.abs() + self.probe_length
    }
}
