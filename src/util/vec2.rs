use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::util::angle::normalize_degrees;

/// 2D vector on the ground plane (world X and Z axes)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, z: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, z: 1.0 };
    /// Heading 0 faces +Z
    pub const FORWARD: Vec2 = Vec2 { x: 0.0, z: 1.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Unit vector at a math angle (radians, counter-clockwise from +X)
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            z: angle.sin(),
        }
    }

    /// Forward vector for a yaw heading in degrees (0 = +Z, clockwise positive)
    #[inline]
    pub fn from_heading(heading_deg: f32) -> Self {
        let rad = heading_deg.to_radians();
        Self {
            x: rad.sin(),
            z: rad.cos(),
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.z * self.z
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                z: self.z / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Returns normalized vector and original length
    pub fn normalize_with_length(&self) -> (Self, f32) {
        let len = self.length();
        if len > 0.0 {
            (
                Self {
                    x: self.x / len,
                    z: self.z / len,
                },
                len,
            )
        } else {
            (Self::ZERO, 0.0)
        }
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.z * other.z
    }

    /// Scalar cross product, positive when `other` lies clockwise of `self`
    /// seen from above
    #[inline]
    pub fn cross(&self, other: Vec2) -> f32 {
        self.z * other.x - self.x * other.z
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    #[inline]
    pub fn distance_sq_to(&self, other: Vec2) -> f32 {
        (*self - other).length_sq()
    }

    /// Rotates by a yaw delta in degrees (clockwise positive seen from above)
    pub fn rotate_yaw(&self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos + self.z * sin,
            z: -self.x * sin + self.z * cos,
        }
    }

    /// Yaw heading of this vector in degrees, normalized to [0, 360)
    pub fn heading(&self) -> f32 {
        normalize_degrees(self.x.atan2(self.z).to_degrees())
    }

    /// Signed yaw from this vector to `other` in degrees, in (-180, 180].
    /// Positive means `other` is to the right (clockwise).
    pub fn signed_angle_to(&self, other: Vec2) -> f32 {
        self.cross(other).atan2(self.dot(other)).to_degrees()
    }

    /// Unsigned angle between the two vectors in degrees
    pub fn angle_between(&self, other: Vec2) -> f32 {
        self.signed_angle_to(other).abs()
    }

    /// Component-wise min
    pub fn min(&self, other: Vec2) -> Self {
        Self {
            x: self.x.min(other.x),
            z: self.z.min(other.z),
        }
    }

    /// Component-wise max
    pub fn max(&self, other: Vec2) -> Self {
        Self {
            x: self.x.max(other.x),
            z: self.z.max(other.z),
        }
    }

    /// Check if vector is approximately equal to another
    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.z - other.z).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            z: self.z - rhs.z,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            z: self.z * rhs,
        }
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self * rhs.x,
            z: self * rhs.z,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            z: -self.z,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.z += rhs.z;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.z -= rhs.z;
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.z *= rhs;
    }
}
