use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

/// 2D vector on the maze ground plane (x east, z south)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, z: 0.0 };
    pub const NORTH: Vec2 = Vec2 { x: 0.0, z: -1.0 };
    pub const SOUTH: Vec2 = Vec2 { x: 0.0, z: 1.0 };
    pub const EAST: Vec2 = Vec2 { x: 1.0, z: 0.0 };
    pub const WEST: Vec2 = Vec2 { x: -1.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Unit forward vector for a heading in radians.
    ///
    /// Heading 0 faces north (-z). Increasing the heading turns left,
    /// so `PI / 2` faces west and `-PI / 2` faces east.
    #[inline]
    pub fn forward(heading: f32) -> Self {
        Self {
            x: -heading.sin(),
            z: -heading.cos(),
        }
    }

    /// Unit vector pointing to the right of `forward(heading)`.
    #[inline]
    pub fn right(heading: f32) -> Self {
        Self {
            x: heading.cos(),
            z: -heading.sin(),
        }
    }

    /// Heading whose forward vector points along this vector.
    pub fn heading(&self) -> f32 {
        (-self.x).atan2(-self.z)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.z * self.z
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    #[inline]
    pub fn distance_sq_to(&self, other: Vec2) -> f32 {
        (*self - other).length_sq()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }

    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.z - other.z).abs() < epsilon
    }
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
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
