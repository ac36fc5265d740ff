//! Incremental yaw rotation
//!
//! Deciding where to face happens once per decision; turning there happens a
//! bounded step per tick. One request is in flight at a time and a new one
//! replaces it.

use crate::config::RotationConfig;
use crate::game::kinematics::Kinematics;
use crate::util::angle::{delta_angle, normalize_degrees};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Clockwise,
    CounterClockwise,
}

impl TurnDirection {
    /// Direction of a signed yaw delta (positive is clockwise)
    pub fn of(delta: f32) -> Self {
        if delta >= 0.0 {
            TurnDirection::Clockwise
        } else {
            TurnDirection::CounterClockwise
        }
    }

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            TurnDirection::Clockwise => 1.0,
            TurnDirection::CounterClockwise => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationState {
    Idle,
    Rotating {
        /// Degrees left to turn, never negative
        remaining: f32,
        direction: TurnDirection,
    },
}

#[derive(Debug, Clone)]
pub struct RotationController {
    config: RotationConfig,
    state: RotationState,
    desired_turn: Option<TurnDirection>,
    requests: u64,
}

impl RotationController {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            state: RotationState::Idle,
            desired_turn: None,
            requests: 0,
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    #[inline]
    pub fn is_rotating(&self) -> bool {
        matches!(self.state, RotationState::Rotating { .. })
    }

    /// Direction of the most recently accepted request
    pub fn desired_turn(&self) -> Option<TurnDirection> {
        self.desired_turn
    }

    /// Number of requests accepted so far (no-ops excluded)
    pub fn requests_issued(&self) -> u64 {
        self.requests
    }

    /// Largest turn a single step may apply
    pub fn max_step(&self, dt: f32) -> f32 {
        self.config.angular_speed * dt
    }

    pub fn remaining(&self) -> f32 {
        match self.state {
            RotationState::Idle => 0.0,
            RotationState::Rotating { remaining, .. } => remaining,
        }
    }

    /// Request a turn from `current` to the absolute heading `target` along
    /// the shortest arc. Returns false if already within epsilon.
    pub fn rotate_towards_angle(&mut self, current: f32, target: f32) -> bool {
        self.rotate_by_relative(delta_angle(current, target))
    }

    /// Request a signed relative turn (positive is clockwise)
    pub fn rotate_by_relative(&mut self, delta: f32) -> bool {
        let delta = delta_angle(0.0, delta);
        if delta.abs() < self.config.epsilon {
            return false;
        }

        let direction = TurnDirection::of(delta);
        self.state = RotationState::Rotating {
            remaining: delta.abs(),
            direction,
        };
        self.desired_turn = Some(direction);
        self.requests += 1;
        true
    }

    /// Advance one tick. Returns the signed yaw applied to `body`.
    pub fn step<K: Kinematics + ?Sized>(&mut self, body: &mut K, dt: f32) -> f32 {
        let RotationState::Rotating { remaining, direction } = self.state else {
            return 0.0;
        };

        let amount = self.max_step(dt).min(remaining);
        let applied = amount * direction.sign();
        body.rotate_to(normalize_degrees(body.heading() + applied));

        let remaining = remaining - amount;
        self.state = if remaining <= self.config.epsilon {
            RotationState::Idle
        } else {
            RotationState::Rotating { remaining, direction }
        };
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::kinematics::Body;
    use crate::util::vec2::Vec2;

    const DT: f32 = 1.0 / 50.0;

    fn controller() -> RotationController {
        RotationController::new(RotationConfig::default())
    }

    fn heading_close(a: f32, b: f32) -> bool {
        delta_angle(a, b).abs() < 0.05
    }

    #[test]
    fn test_noop_request_stays_idle() {
        let mut rot = controller();
        assert!(!rot.rotate_towards_angle(90.0, 90.005));
        assert!(!rot.rotate_towards_angle(0.0, 360.0));
        assert_eq!(rot.state(), RotationState::Idle);
        assert_eq!(rot.requests_issued(), 0);
    }

    #[test]
    fn test_shortest_arc_across_wrap() {
        let mut rot = controller();
        assert!(rot.rotate_towards_angle(350.0, 10.0));
        assert_eq!(
            rot.state(),
            RotationState::Rotating {
                remaining: 20.0,
                direction: TurnDirection::Clockwise
            }
        );

        let mut body = Body::new(Vec2::ZERO, 350.0);
        while rot.is_rotating() {
            rot.step(&mut body, DT);
        }
        assert!(heading_close(body.heading(), 10.0));
    }

    #[test]
    fn test_step_is_speed_limited() {
        let mut rot = controller();
        let mut body = Body::new(Vec2::ZERO, 0.0);
        rot.rotate_by_relative(-90.0);

        let applied = rot.step(&mut body, DT);
        assert!((applied + 2.4).abs() < 1e-4);
        assert!(heading_close(body.heading(), 357.6));
        assert!((rot.remaining() - 87.6).abs() < 1e-3);
        assert_eq!(rot.desired_turn(), Some(TurnDirection::CounterClockwise));
    }

    #[test]
    fn test_convergence_bound() {
        let speed_dt = RotationConfig::default().angular_speed * DT;
        let starts = [0.0, 37.0, 179.0, 181.0, 270.0, 359.5];
        let targets = [0.0, 1.0, 45.0, 90.0, 180.0, 200.0, 315.0, 359.0];

        for &start in &starts {
            for &target in &targets {
                let mut rot = controller();
                let mut body = Body::new(Vec2::ZERO, start);
                let max_delta = delta_angle(start, target).abs();
                rot.rotate_towards_angle(start, target);

                let bound = (max_delta / speed_dt).ceil() as usize;
                let mut ticks = 0;
                while rot.is_rotating() {
                    rot.step(&mut body, DT);
                    ticks += 1;
                    assert!(ticks <= bound, "{} -> {} took more than {} ticks", start, target, bound);
                }

                assert!(heading_close(body.heading(), target), "{} -> {}", start, target);
                assert_eq!(rot.step(&mut body, DT), 0.0);
                assert_eq!(rot.state(), RotationState::Idle);
            }
        }
    }

    #[test]
    fn test_new_request_overwrites() {
        let mut rot = controller();
        let mut body = Body::new(Vec2::ZERO, 0.0);
        rot.rotate_by_relative(90.0);
        rot.step(&mut body, DT);

        rot.rotate_towards_angle(body.heading(), 300.0);
        assert_eq!(rot.desired_turn(), Some(TurnDirection::CounterClockwise));
        while rot.is_rotating() {
            rot.step(&mut body, DT);
        }
        assert!(heading_close(body.heading(), 300.0));
        assert_eq!(rot.requests_issued(), 2);
    }
}
