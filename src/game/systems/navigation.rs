//! Per-tick steering for one agent
//!
//! Obstacle avoidance outranks wall-following, which outranks facing the
//! navigation target. Whatever was requested, the rotation controller then
//! advances one step and the agent moves forward if allowed.

use crate::config::{NavigationConfig, TacticsConfig};
use crate::game::constants::navigation::ALLOWED_HEADINGS;
use crate::game::constants::rotation::{DEGENERATE_DIRECTION_SQ, FACING_DEADZONE};
use crate::game::kinematics::Kinematics;
use crate::game::spatial::SpatialQuery;
use crate::game::systems::obstacles::{ObstacleDetector, ProbeSet};
use crate::game::systems::rotation::{RotationController, TurnDirection};
use crate::util::vec2::Vec2;

/// Rotation request issued during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringDecision {
    /// Forward probe blocked; relative turn in degrees
    AvoidForward { degrees: f32 },
    /// Near-left blocked; heading snapped to
    SnapClockwise { heading: f32 },
    /// Near-right blocked; heading snapped to
    SnapCounterClockwise { heading: f32 },
    /// Clamped turn toward the navigation target
    FaceTarget { degrees: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorTick {
    pub decision: Option<SteeringDecision>,
    pub probes: ProbeSet,
    pub moved: bool,
}

/// Next allowed heading strictly past `current` in the given direction,
/// wrapping at either end of the set
pub fn next_allowed_heading(current: f32, direction: TurnDirection) -> f32 {
    match direction {
        TurnDirection::Clockwise => ALLOWED_HEADINGS
            .iter()
            .copied()
            .find(|&h| h > current)
            .unwrap_or(ALLOWED_HEADINGS[0]),
        TurnDirection::CounterClockwise => ALLOWED_HEADINGS
            .iter()
            .rev()
            .copied()
            .find(|&h| h < current)
            .unwrap_or(ALLOWED_HEADINGS[ALLOWED_HEADINGS.len() - 1]),
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    config: NavigationConfig,
    detector: ObstacleDetector,
    rotation: RotationController,
}

impl Navigator {
    pub fn new(config: NavigationConfig, detector: ObstacleDetector, rotation: RotationController) -> Self {
        Self {
            config,
            detector,
            rotation,
        }
    }

    pub fn from_config(config: &TacticsConfig) -> Self {
        Self::new(
            config.navigation,
            ObstacleDetector::new(config.probes),
            RotationController::new(config.rotation),
        )
    }

    pub fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    pub fn probes(&self) -> ProbeSet {
        self.detector.probes()
    }

    /// Run one navigation tick. With no target the agent still avoids
    /// obstacles but holds position.
    pub fn tick<K, Q>(&mut self, body: &mut K, query: &Q, target: Option<Vec2>, can_move: bool, dt: f32) -> NavigatorTick
    where
        K: Kinematics + ?Sized,
        Q: SpatialQuery + ?Sized,
    {
        let probes = self.detector.update(query, body.position(), body.heading());
        let decision = self.steer(body, &probes, target, dt);

        self.rotation.step(body, dt);

        let moved = can_move && target.is_some();
        if moved {
            let step = body.forward() * (self.config.move_speed * dt);
            body.move_to(body.position() + step);
        }

        NavigatorTick {
            decision,
            probes,
            moved,
        }
    }

    fn steer<K: Kinematics + ?Sized>(
        &mut self,
        body: &K,
        probes: &ProbeSet,
        target: Option<Vec2>,
        dt: f32,
    ) -> Option<SteeringDecision> {
        let heading = body.heading();

        if probes.forward {
            let degrees = self.avoidance_turn(probes);
            return self
                .rotation
                .rotate_by_relative(degrees)
                .then_some(SteeringDecision::AvoidForward { degrees });
        }

        if probes.near_left {
            let snapped = next_allowed_heading(heading, TurnDirection::Clockwise);
            return self
                .rotation
                .rotate_towards_angle(heading, snapped)
                .then_some(SteeringDecision::SnapClockwise { heading: snapped });
        }

        if probes.near_right {
            let snapped = next_allowed_heading(heading, TurnDirection::CounterClockwise);
            return self
                .rotation
                .rotate_towards_angle(heading, snapped)
                .then_some(SteeringDecision::SnapCounterClockwise { heading: snapped });
        }

        if self.rotation.is_rotating() {
            return None;
        }

        let degrees = self.facing_turn(body, probes, target?, dt)?;
        self.rotation
            .rotate_by_relative(degrees)
            .then_some(SteeringDecision::FaceTarget { degrees })
    }

    /// Relative turn away from a blocked forward probe
    fn avoidance_turn(&self, probes: &ProbeSet) -> f32 {
        let avoid = self.config.avoid_turn;
        match (probes.near_left, probes.near_right) {
            (true, false) => avoid,
            (false, true) => -avoid,
            _ if !probes.far_left => -avoid,
            _ if !probes.far_right => avoid,
            _ => self.config.blocked_turn,
        }
    }

    /// Clamped turn toward `target`, or `None` when already facing it, the
    /// direction is degenerate, or the turn would swing into a blocked side
    fn facing_turn<K: Kinematics + ?Sized>(&self, body: &K, probes: &ProbeSet, target: Vec2, dt: f32) -> Option<f32> {
        let to_target = target - body.position();
        if to_target.length_sq() < DEGENERATE_DIRECTION_SQ {
            return None;
        }

        let angle = body.forward().signed_angle_to(to_target);
        if angle.abs() < FACING_DEADZONE {
            return None;
        }

        let blocked = match TurnDirection::of(angle) {
            TurnDirection::Clockwise => probes.far_right,
            TurnDirection::CounterClockwise => probes.far_left,
        };
        if blocked {
            return None;
        }

        let max_step = self.rotation.max_step(dt);
        Some(angle.clamp(-max_step, max_step))
    }
}
