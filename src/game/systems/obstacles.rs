//! Five-ray obstacle probe fan

use crate::config::ProbeConfig;
use crate::game::spatial::{LayerMask, SpatialQuery};
use crate::util::vec2::Vec2;

/// Latest probe results. Replaced wholesale every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeSet {
    pub forward: bool,
    pub near_left: bool,
    pub near_right: bool,
    pub far_left: bool,
    pub far_right: bool,
}

impl ProbeSet {
    pub fn any(&self) -> bool {
        self.forward || self.near_left || self.near_right || self.far_left || self.far_right
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleDetector {
    config: ProbeConfig,
    mask: LayerMask,
    probes: ProbeSet,
}

impl ObstacleDetector {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            mask: LayerMask::OBSTACLE,
            probes: ProbeSet::default(),
        }
    }

    pub fn with_mask(mut self, mask: LayerMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn probes(&self) -> ProbeSet {
        self.probes
    }

    /// Recast all five rays from `position` facing `heading`
    pub fn update<Q: SpatialQuery + ?Sized>(&mut self, query: &Q, position: Vec2, heading: f32) -> ProbeSet {
        let forward = Vec2::from_heading(heading);
        let ProbeConfig {
            near_distance,
            far_distance,
            inner_angle,
            outer_angle,
        } = self.config;

        let blocked = |offset: f32, distance: f32| {
            query
                .raycast(position, forward.rotate_yaw(offset), distance, self.mask)
                .is_some()
        };

        self.probes = ProbeSet {
            forward: blocked(0.0, near_distance),
            near_left: blocked(-inner_angle, near_distance),
            near_right: blocked(inner_angle, near_distance),
            far_left: blocked(-outer_angle, far_distance),
            far_right: blocked(outer_angle, far_distance),
        };
        self.probes
    }
}
