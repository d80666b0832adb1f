//! Core type definitions used throughout the codebase

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Orientation in radians
///
/// Angle 0 points along world +Y; positive angles rotate towards +X.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(pub f32);

impl Angle {
    pub const fn from_radians(rad: f32) -> Self {
        Self(rad)
    }

    pub fn from_degrees(deg: f32) -> Self {
        Self(deg.to_radians())
    }

    #[inline]
    pub fn rad(self) -> f32 {
        self.0
    }

    pub fn deg(self) -> f32 {
        self.0.to_degrees()
    }

    /// Unit vector pointing in this direction
    #[inline]
    pub fn to_direction(self) -> Vec2 {
        let (sin, cos) = self.0.sin_cos();
        Vec2::new(sin, cos)
    }

    /// Angle of a (not necessarily normalized) direction vector
    #[inline]
    pub fn from_direction(dir: Vec2) -> Self {
        Self(dir.x.atan2(dir.y))
    }

    /// Wrap into the (-PI, PI] range
    pub fn normalized(self) -> Self {
        let mut r = self.0 % TAU;
        if r > PI {
            r -= TAU;
        } else if r <= -PI {
            r += TAU;
        }
        Self(r)
    }
}

impl std::ops::Add for Angle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Left-hand orthogonal of a direction
///
/// For the identity direction (0, 1) this is (1, 0), so a grid rotated by
/// `Angle(0.0)` has its local axes aligned with world axes.
#[inline]
pub fn ortho_l(dir: Vec2) -> Vec2 {
    Vec2::new(dir.y, -dir.x)
}
