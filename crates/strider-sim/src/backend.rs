//! Spatial query and translation backend consumed by the simulation.
//!
//! The simulation never touches collision geometry directly. Every ground
//! check, edge probe and swept move goes through a [`MotionBackend`], which a
//! host implements on top of its collision world (see `strider-engine` for a
//! rapier2d implementation). [`ScriptedBackend`] answers queries from plain
//! flags or a flat floor and is what tests and benches use.

use crate::math::Vec3;

/// Collision queries and swept translation for a single character.
///
/// All queries are evaluated against the "solid surfaces" the character can
/// stand on; triggers and decorative geometry must be excluded by the
/// implementation.
pub trait MotionBackend {
    /// Current character position (the point the ground box is centered on).
    fn position(&self) -> Vec3;

    /// Place the character directly, without sweeping through geometry.
    fn set_position(&mut self, position: Vec3);

    /// Whether an axis-aligned box at `center` overlaps any solid surface.
    fn overlap_box(&self, center: Vec3, half_extents: Vec3) -> bool;

    /// Whether a ray cast straight down from `origin` hits a solid surface
    /// within `max_distance`.
    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> bool;

    /// Move the character by `delta`, stopping against solid geometry.
    ///
    /// Has no effect while translation is disabled.
    fn translate(&mut self, delta: Vec3);

    /// Switch swept translation on or off.
    ///
    /// Swept controllers must be switched off while the character is
    /// teleported, otherwise the next sweep resolves against the old spot.
    fn set_translation_enabled(&mut self, enabled: bool);

    /// Whether swept translation is currently on.
    fn translation_enabled(&self) -> bool;
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// In-memory backend whose answers are set by the caller.
///
/// Two modes:
///
/// - **Flags** (default): [`overlap_box`](MotionBackend::overlap_box) returns
///   the ground flag; [`raycast_down`](MotionBackend::raycast_down) returns the
///   front flag for probes ahead of the character and the back flag for probes
///   behind it.
/// - **Floor**: after [`with_floor`](Self::with_floor), queries are answered
///   geometrically against an infinite horizontal plane and translation never
///   sinks below it.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    position: Vec3,
    floor: Option<f32>,
    ground: bool,
    front_support: bool,
    back_support: bool,
    translation_enabled: bool,
    translate_calls: usize,
    teleports: usize,
}

impl ScriptedBackend {
    /// Create a backend at `position` with no ground and no edge support.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            floor: None,
            ground: false,
            front_support: false,
            back_support: false,
            translation_enabled: true,
            translate_calls: 0,
            teleports: 0,
        }
    }

    /// Answer queries against a flat floor at height `floor_y`.
    pub fn with_floor(mut self, floor_y: f32) -> Self {
        self.floor = Some(floor_y);
        self
    }

    /// Set what the ground overlap test reports (flag mode).
    pub fn set_ground(&mut self, grounded: bool) {
        self.ground = grounded;
    }

    /// Set what the front and back edge probes report (flag mode).
    pub fn set_edge_support(&mut self, front: bool, back: bool) {
        self.front_support = front;
        self.back_support = back;
    }

    /// Number of [`translate`](MotionBackend::translate) calls that moved the
    /// character.
    pub fn translate_calls(&self) -> usize {
        self.translate_calls
    }

    /// Number of direct placements made while translation was disabled.
    pub fn teleports(&self) -> usize {
        self.teleports
    }
}

impl MotionBackend for ScriptedBackend {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        if !self.translation_enabled {
            self.teleports += 1;
        }
        self.position = position;
    }

    fn overlap_box(&self, center: Vec3, half_extents: Vec3) -> bool {
        match self.floor {
            Some(floor_y) => center.y - half_extents.y <= floor_y,
            None => self.ground,
        }
    }

    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> bool {
        match self.floor {
            Some(floor_y) => origin.y >= floor_y && origin.y - max_distance <= floor_y,
            None if origin.x >= self.position.x => self.front_support,
            None => self.back_support,
        }
    }

    fn translate(&mut self, delta: Vec3) {
        if !self.translation_enabled {
            return;
        }
        self.translate_calls += 1;
        self.position += delta;
        if let Some(floor_y) = self.floor {
            self.position.y = self.position.y.max(floor_y);
        }
    }

    fn set_translation_enabled(&mut self, enabled: bool) {
        self.translation_enabled = enabled;
    }

    fn translation_enabled(&self) -> bool {
        self.translation_enabled
    }
}
