//! rapier2d-backed [`MotionBackend`].
//!
//! The [`RapierBackend`] holds the level's static geometry in rapier collider
//! storage and answers the simulation's queries through rapier's
//! [`QueryPipeline`]:
//!
//! - the ground check is a cuboid intersection test;
//! - edge probes are downward ray casts;
//! - swept translation goes through a [`KinematicCharacterController`].
//!
//! The character itself is not a rapier body. Its position (the point at its
//! feet) is stored here and only moves through [`MotionBackend`] calls.
//!
//! # Collision groups
//!
//! Standing surfaces are members of [`SOLID`]. Every query filters on that
//! group and skips sensors, so triggers such as accelerator and slime volumes
//! never count as ground.
//!
//! # Determinism
//!
//! rapier2d is compiled with `enhanced-determinism`, and the backend never
//! steps a physics pipeline, so query results depend only on the inserted
//! geometry and the character position.

use rapier2d::control::{CharacterLength, KinematicCharacterController};
use rapier2d::prelude::*;
use strider_sim::{MotionBackend, Vec3};
use tracing::{debug, trace};

/// Collision group of surfaces the runner can stand on.
pub const SOLID: Group = Group::GROUP_1;

/// Collision group of trigger volumes.
pub const TRIGGERS: Group = Group::GROUP_2;

/// Time step handed to the character controller. Only slope and snapping
/// logic read it; the backend disables both.
const CONTROLLER_DT: Real = 1.0 / 60.0;

/// Gap the character controller keeps between the character and geometry.
const CONTROLLER_OFFSET: Real = 0.01;

// ---------------------------------------------------------------------------
// RapierBackend
// ---------------------------------------------------------------------------

/// Collision world for a single runner.
pub struct RapierBackend {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    queries: QueryPipeline,
    controller: KinematicCharacterController,
    /// Swept shape: a cuboid standing on `position`.
    character_shape: Cuboid,
    character_half_height: Real,
    position: Vec3,
    translation_enabled: bool,
}

impl std::fmt::Debug for RapierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapierBackend")
            .field("colliders", &self.colliders.len())
            .field("position", &self.position)
            .field("translation_enabled", &self.translation_enabled)
            .finish_non_exhaustive()
    }
}

impl RapierBackend {
    /// Create an empty world with the character's feet at `position`.
    ///
    /// `character_half_extents` sizes the swept cuboid (`x` and `y` are used).
    pub fn new(position: Vec3, character_half_extents: Vec3) -> Self {
        let controller = KinematicCharacterController {
            offset: CharacterLength::Absolute(CONTROLLER_OFFSET),
            snap_to_ground: None,
            autostep: None,
            ..Default::default()
        };

        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            queries: QueryPipeline::new(),
            controller,
            character_shape: Cuboid::new(vector![
                character_half_extents.x,
                character_half_extents.y
            ]),
            character_half_height: character_half_extents.y,
            position,
            translation_enabled: true,
        }
    }

    /// Add a static standing surface: an axis-aligned box.
    pub fn add_platform(&mut self, center: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .translation(vector![center.x, center.y])
            .collision_groups(InteractionGroups::new(SOLID, Group::ALL))
            .build();
        let handle = self.colliders.insert(collider);
        self.queries.update(&self.colliders);
        debug!(x = center.x, y = center.y, "platform added");
        handle
    }

    /// Add a trigger volume. Triggers are ignored by every motion query.
    pub fn add_trigger(&mut self, center: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .translation(vector![center.x, center.y])
            .sensor(true)
            .collision_groups(InteractionGroups::new(TRIGGERS, Group::ALL))
            .build();
        let handle = self.colliders.insert(collider);
        self.queries.update(&self.colliders);
        handle
    }

    /// Number of colliders (platforms and triggers).
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Query filter matching standing surfaces only.
    fn solid_filter() -> QueryFilter<'static> {
        QueryFilter::default()
            .exclude_sensors()
            .groups(InteractionGroups::new(Group::ALL, SOLID))
    }

    /// Isometry of the swept cuboid for feet at `feet`.
    fn character_pose(&self, feet: Vec3) -> Isometry<Real> {
        Isometry::translation(feet.x, feet.y + self.character_half_height)
    }
}

impl MotionBackend for RapierBackend {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn overlap_box(&self, center: Vec3, half_extents: Vec3) -> bool {
        let shape = Cuboid::new(vector![half_extents.x, half_extents.y]);
        let pose = Isometry::translation(center.x, center.y);
        self.queries
            .intersection_with_shape(
                &self.bodies,
                &self.colliders,
                &pose,
                &shape,
                Self::solid_filter(),
            )
            .is_some()
    }

    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> bool {
        let ray = Ray::new(
            point![origin.x, origin.y],
            vector![0.0, -1.0],
        );
        self.queries
            .cast_ray(
                &self.bodies,
                &self.colliders,
                &ray,
                max_distance,
                true,
                Self::solid_filter(),
            )
            .is_some()
    }

    fn translate(&mut self, delta: Vec3) {
        if !self.translation_enabled {
            return;
        }

        let pose = self.character_pose(self.position);
        let movement = self.controller.move_shape(
            CONTROLLER_DT,
            &self.bodies,
            &self.colliders,
            &self.queries,
            &self.character_shape,
            &pose,
            vector![delta.x, delta.y],
            Self::solid_filter(),
            |_| {},
        );

        self.position.x += movement.translation.x;
        self.position.y += movement.translation.y;
        trace!(
            dx = movement.translation.x,
            dy = movement.translation.y,
            grounded = movement.grounded,
            "swept translation"
        );
    }

    fn set_translation_enabled(&mut self, enabled: bool) {
        self.translation_enabled = enabled;
    }

    fn translation_enabled(&self) -> bool {
        self.translation_enabled
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CHARACTER: Vec3 = Vec3::new(0.125, 0.4, 0.0);
    const GROUND_BOX: Vec3 = Vec3::new(0.125, 0.05, 0.45);

    /// A platform spanning x in [-5, 5] with its top surface at y = 0.
    fn level(position: Vec3) -> RapierBackend {
        let mut backend = RapierBackend::new(position, CHARACTER);
        backend.add_platform(Vec3::new(0.0, -0.5, 0.0), Vec3::new(5.0, 0.5, 0.0));
        backend
    }

    #[test]
    fn ground_box_detects_surface_under_feet() {
        let backend = level(Vec3::new(0.0, 0.02, 0.0));
        assert!(backend.overlap_box(backend.position(), GROUND_BOX));

        let high = level(Vec3::new(0.0, 1.0, 0.0));
        assert!(!high.overlap_box(high.position(), GROUND_BOX));
    }

    #[test]
    fn ground_box_misses_past_the_edge() {
        let backend = level(Vec3::new(5.2, 0.0, 0.0));
        assert!(!backend.overlap_box(backend.position(), GROUND_BOX));
    }

    #[test]
    fn ray_hits_within_reach_only() {
        let backend = level(Vec3::ZERO);
        assert!(backend.raycast_down(Vec3::new(0.0, 0.05, 0.0), 0.26));
        assert!(!backend.raycast_down(Vec3::new(0.0, 1.0, 0.0), 0.26));
        assert!(!backend.raycast_down(Vec3::new(6.0, 0.05, 0.0), 0.26));
    }

    #[test]
    fn triggers_are_not_ground() {
        let mut backend = RapierBackend::new(Vec3::new(20.0, 0.0, 0.0), CHARACTER);
        backend.add_trigger(Vec3::new(20.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(backend.collider_count(), 1);
        assert!(!backend.overlap_box(backend.position(), GROUND_BOX));
        assert!(!backend.raycast_down(Vec3::new(20.0, 0.5, 0.0), 1.0));
    }

    #[test]
    fn translate_stops_on_platform() {
        let mut backend = level(Vec3::new(0.0, 0.5, 0.0));
        backend.translate(Vec3::new(0.0, -2.0, 0.0));
        let y = backend.position().y;
        assert!(y >= 0.0 && y < 0.05, "feet should rest on the surface, got y = {y}");
    }

    #[test]
    fn translate_moves_freely_in_open_space() {
        let mut backend = level(Vec3::new(0.0, 2.0, 0.0));
        backend.translate(Vec3::new(1.0, 0.5, 0.0));
        let p = backend.position();
        assert!((p.x - 1.0).abs() < 1e-4);
        assert!((p.y - 2.5).abs() < 1e-4);
    }

    #[test]
    fn disabled_translation_ignores_moves() {
        let mut backend = level(Vec3::new(0.0, 2.0, 0.0));
        backend.set_translation_enabled(false);
        backend.translate(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(backend.position(), Vec3::new(0.0, 2.0, 0.0));

        backend.set_position(Vec3::new(3.0, 1.0, 0.0));
        assert_eq!(backend.position(), Vec3::new(3.0, 1.0, 0.0));
    }
}
