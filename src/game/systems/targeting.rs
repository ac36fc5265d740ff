//! Line-of-sight checks
//!
//! `line_of_sight` is the bare "is anything in the way" ray. `TargetingSystem`
//! layers the turret's detection rules on top: range, field of view, and an
//! optional sphere cast so allies are never shot through.

use crate::config::TurretConfig;
use crate::game::spatial::{ColliderId, LayerMask, SpatialQuery};
use crate::util::vec2::Vec2;

/// True when no collider on `blockers` lies between `from` and `to`
pub fn line_of_sight<Q: SpatialQuery + ?Sized>(query: &Q, from: Vec2, to: Vec2, blockers: LayerMask) -> bool {
    let (dir, distance) = (to - from).normalize_with_length();
    if distance <= f32::EPSILON {
        return true;
    }
    query.raycast(from, dir, distance, blockers).is_none()
}

/// Detection rules for a stationary shooter
#[derive(Debug, Clone, Copy)]
pub struct TargetingSystem {
    detection_range: Option<f32>,
    detection_angle: Option<f32>,
    friendly_radius: Option<f32>,
    blockers: LayerMask,
    allies: LayerMask,
}

impl TargetingSystem {
    pub fn new(config: &TurretConfig) -> Self {
        Self {
            detection_range: config.detection_range,
            detection_angle: config.detection_angle,
            friendly_radius: config.friendly_radius,
            blockers: LayerMask::SIGHT_BLOCKERS,
            allies: LayerMask::ENEMY,
        }
    }

    pub fn with_blockers(mut self, blockers: LayerMask) -> Self {
        self.blockers = blockers;
        self
    }

    /// Whether the shooter at `origin` facing `heading` can see `target`.
    /// A missing target is never visible.
    pub fn can_see<Q: SpatialQuery + ?Sized>(
        &self,
        query: &Q,
        origin: Vec2,
        heading: f32,
        own_collider: Option<ColliderId>,
        target: Option<Vec2>,
    ) -> bool {
        let Some(target) = target else {
            return false;
        };

        let to_target = target - origin;
        let (dir, distance) = to_target.normalize_with_length();

        if let Some(range) = self.detection_range {
            if distance > range {
                return false;
            }
        }

        if let Some(half_angle) = self.detection_angle {
            if distance > f32::EPSILON && Vec2::from_heading(heading).angle_between(dir) > half_angle {
                return false;
            }
        }

        if distance <= f32::EPSILON {
            return true;
        }

        if query.raycast(origin, dir, distance, self.blockers).is_some() {
            return false;
        }

        if let Some(radius) = self.friendly_radius {
            if let Some(hit) = query.sphere_cast(origin, radius, dir, distance, self.allies) {
                if Some(hit.collider) != own_collider {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::spatial::{Layer, Shape, Tag, World};

    fn targeting() -> TargetingSystem {
        TargetingSystem::new(&TurretConfig::default())
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut world = World::default();
        world.insert(
            Shape::Rect {
                min: Vec2::new(-1.0, 4.0),
                max: Vec2::new(1.0, 5.0),
            },
            Layer::Wall,
            Tag::Untagged,
        );

        assert!(!line_of_sight(&world, Vec2::ZERO, Vec2::new(0.0, 8.0), LayerMask::SIGHT_BLOCKERS));
        assert!(line_of_sight(&world, Vec2::ZERO, Vec2::new(0.0, 3.0), LayerMask::SIGHT_BLOCKERS));
        assert!(line_of_sight(&world, Vec2::ZERO, Vec2::new(8.0, 0.0), LayerMask::SIGHT_BLOCKERS));
        assert!(line_of_sight(&world, Vec2::ZERO, Vec2::ZERO, LayerMask::SIGHT_BLOCKERS));
    }

    #[test]
    fn test_missing_target_not_visible() {
        let world = World::default();
        assert!(!targeting().can_see(&world, Vec2::ZERO, 0.0, None, None));
    }

    #[test]
    fn test_range_and_cone() {
        let world = World::default();
        let t = targeting();

        assert!(t.can_see(&world, Vec2::ZERO, 0.0, None, Some(Vec2::new(0.0, 8.0))));
        // Beyond the 10 unit range
        assert!(!t.can_see(&world, Vec2::ZERO, 0.0, None, Some(Vec2::new(0.0, 12.0))));
        // 90 degrees off a 45 degree half-cone
        assert!(!t.can_see(&world, Vec2::ZERO, 0.0, None, Some(Vec2::new(8.0, 0.0))));
        // Same point once the shooter faces it
        assert!(t.can_see(&world, Vec2::ZERO, 90.0, None, Some(Vec2::new(8.0, 0.0))));
    }

    #[test]
    fn test_unlimited_detection() {
        let world = World::default();
        let config = TurretConfig {
            detection_range: None,
            detection_angle: None,
            ..TurretConfig::default()
        };
        let t = TargetingSystem::new(&config);
        assert!(t.can_see(&world, Vec2::ZERO, 0.0, None, Some(Vec2::new(0.0, -40.0))));
    }

    #[test]
    fn test_ally_in_the_way_blocks() {
        let mut world = World::default();
        world.insert(
            Shape::Circle {
                center: Vec2::new(0.3, 4.0),
                radius: 0.5,
            },
            Layer::Enemy,
            Tag::Enemy,
        );

        let t = targeting();
        assert!(!t.can_see(&world, Vec2::ZERO, 0.0, None, Some(Vec2::new(0.0, 8.0))));

        let no_friendly = TargetingSystem::new(&TurretConfig {
            friendly_radius: None,
            ..TurretConfig::default()
        });
        // Plain ray at x = 0 still clips the ally, but allies are not sight blockers
        assert!(no_friendly.can_see(&world, Vec2::ZERO, 0.0, None, Some(Vec2::new(0.0, 8.0))));
    }

    #[test]
    fn test_obstacle_blocks() {
        let mut world = World::default();
        world.insert(
            Shape::Circle {
                center: Vec2::new(0.0, 4.0),
                radius: 1.0,
            },
            Layer::Obstacle,
            Tag::Untagged,
        );
        assert!(!targeting().can_see(&world, Vec2::ZERO, 0.0, None, Some(Vec2::new(0.0, 8.0))));
    }
}
