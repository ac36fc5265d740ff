//! Agent kinematic handle
//!
//! The AI never writes position or heading directly; it issues `move_to` and
//! `rotate_to` commands so a physics-integrated host can apply them.

use serde::{Deserialize, Serialize};

use crate::util::angle::normalize_degrees;
use crate::util::vec2::Vec2;

pub trait Kinematics {
    fn position(&self) -> Vec2;

    /// Yaw in degrees, [0, 360)
    fn heading(&self) -> f32;

    fn move_to(&mut self, position: Vec2);

    fn rotate_to(&mut self, heading: f32);

    fn forward(&self) -> Vec2 {
        Vec2::from_heading(self.heading())
    }
}

/// Plain kinematic body used by the simulation driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    heading: f32,
}

impl Body {
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading: normalize_degrees(heading),
        }
    }
}

impl Kinematics for Body {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn heading(&self) -> f32 {
        self.heading
    }

    fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    fn rotate_to(&mut self, heading: f32) {
        self.heading = normalize_degrees(heading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_normalizes_heading() {
        let mut body = Body::new(Vec2::ZERO, -90.0);
        assert!((body.heading() - 270.0).abs() < 1e-4);

        body.rotate_to(725.0);
        assert!((body.heading() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_forward_follows_heading() {
        let body = Body::new(Vec2::ZERO, 90.0);
        assert!(body.forward().approx_eq(Vec2::RIGHT, 1e-5));
    }
}
