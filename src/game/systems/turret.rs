//! Stationary turret: sweep an arc until the target is seen, then track it
//!
//! Transitions are evaluated every tick with no dwell time, so a target on
//! the edge of visibility makes the turret flicker between states.

use serde::Serialize;

use crate::config::TurretConfig;
use crate::game::constants::turret::RETURN_TOLERANCE;
use crate::game::kinematics::Kinematics;
use crate::game::systems::rotation::TurnDirection;
use crate::util::angle::{delta_angle, move_towards_angle, normalize_degrees};
use crate::util::vec2::Vec2;

/// Squared length below which the target counts as on top of the turret
const TRACK_DEGENERATE_SQ: f32 = 0.001;

/// Projectile spawner driven by the turret
pub trait Weapon {
    fn fire(&mut self, origin: Vec2, direction: Vec2);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurretState {
    Scanning,
    Tracking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurretTick {
    pub state: TurretState,
    pub fired: bool,
}

#[derive(Debug, Clone)]
pub struct TurretAi {
    config: TurretConfig,
    start_angle: f32,
    scan_direction: TurnDirection,
    state: TurretState,
}

impl TurretAi {
    pub fn new(config: TurretConfig, start_angle: f32) -> Self {
        Self {
            config,
            start_angle: normalize_degrees(start_angle),
            scan_direction: TurnDirection::Clockwise,
            state: TurretState::Scanning,
        }
    }

    pub fn state(&self) -> TurretState {
        self.state
    }

    pub fn start_angle(&self) -> f32 {
        self.start_angle
    }

    pub fn scan_direction(&self) -> TurnDirection {
        self.scan_direction
    }

    /// Advance one tick. `can_see` is asked about visibility from the
    /// turret's pose at the moment the transition is evaluated.
    pub fn tick<K, W, F>(&mut self, body: &mut K, target: Option<Vec2>, mut can_see: F, weapon: &mut W, dt: f32) -> TurretTick
    where
        K: Kinematics + ?Sized,
        W: Weapon + ?Sized,
        F: FnMut(Vec2, f32) -> bool,
    {
        let mut fired = false;

        match self.state {
            TurretState::Scanning => {
                self.scan(body, dt);
                if can_see(body.position(), body.heading()) {
                    tracing::debug!(heading = body.heading(), "Turret acquired target");
                    self.state = TurretState::Tracking;
                }
            }
            TurretState::Tracking => {
                if !can_see(body.position(), body.heading()) {
                    tracing::debug!(heading = body.heading(), "Turret lost target");
                    self.state = TurretState::Scanning;
                } else if let Some(target) = target {
                    fired = self.track_and_fire(body, target, weapon, dt);
                }
            }
        }

        TurretTick {
            state: self.state,
            fired,
        }
    }

    fn scan<K: Kinematics + ?Sized>(&mut self, body: &mut K, dt: f32) {
        let current = body.heading();
        if delta_angle(current, self.start_angle).abs() <= self.config.scan_angle {
            self.sweep(body, current, dt);
        } else {
            self.return_to_arc(body, current, dt);
        }
    }

    /// Step along the arc; the step is taken even when it crosses the edge,
    /// and the next sweep heads back
    fn sweep<K: Kinematics + ?Sized>(&mut self, body: &mut K, current: f32, dt: f32) {
        let next = current + self.scan_direction.sign() * self.config.scan_speed * dt;
        if delta_angle(next, self.start_angle).abs() > self.config.scan_angle {
            self.scan_direction = match self.scan_direction {
                TurnDirection::Clockwise => TurnDirection::CounterClockwise,
                TurnDirection::CounterClockwise => TurnDirection::Clockwise,
            };
        }
        body.rotate_to(next);
    }

    fn return_to_arc<K: Kinematics + ?Sized>(&mut self, body: &mut K, current: f32, dt: f32) {
        let next = move_towards_angle(current, self.start_angle, self.config.scan_speed * dt);
        body.rotate_to(next);
        if delta_angle(next, self.start_angle).abs() < RETURN_TOLERANCE {
            self.scan_direction = TurnDirection::Clockwise;
        }
    }

    /// Turn toward `target` and fire once aligned. Returns whether it fired.
    fn track_and_fire<K, W>(&mut self, body: &mut K, target: Vec2, weapon: &mut W, dt: f32) -> bool
    where
        K: Kinematics + ?Sized,
        W: Weapon + ?Sized,
    {
        let to_target = target - body.position();
        let error = if to_target.length_sq() > TRACK_DEGENERATE_SQ {
            let wanted = to_target.heading();
            let next = move_towards_angle(body.heading(), wanted, self.config.track_speed * dt);
            body.rotate_to(next);
            delta_angle(next, wanted).abs()
        } else {
            0.0
        };

        if error < self.config.fire_alignment {
            weapon.fire(body.position(), body.forward());
            true
        } else {
            false
        }
    }
}
