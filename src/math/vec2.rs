//! 2D fixed-point vector
//!
//! Rotations take a unit heading `(cos, sin)` instead of an angle, so no
//! trigonometry ever runs on the simulation side.

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Fixed;

/// 2D vector with [`Fixed`] components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2d {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vec2d {
    pub const ZERO: Self = Self::new(Fixed::ZERO, Fixed::ZERO);
    /// Heading (1, 0), the identity rotation
    pub const RIGHT: Self = Self::new(Fixed::ONE, Fixed::ZERO);
    /// Heading (0, 1), the default start heading
    pub const UP: Self = Self::new(Fixed::ZERO, Fixed::ONE);

    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn from_int(x: i64, y: i64) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y))
    }

    #[inline]
    pub const fn from_raw(x: i64, y: i64) -> Self {
        Self::new(Fixed::from_raw(x), Fixed::from_raw(y))
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Squared length (no square root)
    #[inline]
    pub fn sqr_magnitude(self) -> Fixed {
        self.x.mul(self.x) + self.y.mul(self.y)
    }

    #[inline]
    pub fn magnitude(self) -> Fixed {
        self.sqr_magnitude().sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag.is_zero() {
            return self;
        }
        self.div_fixed(mag)
    }

    /// Rotate by a unit heading `(cos, sin)`
    #[inline]
    pub fn rotate(self, heading: Self) -> Self {
        let (cos, sin) = (heading.x, heading.y);
        Self::new(
            self.x.mul(cos) - self.y.mul(sin),
            self.x.mul(sin) + self.y.mul(cos),
        )
    }

    /// Undo [`rotate`](Self::rotate) for the same heading
    #[inline]
    pub fn rotate_inverse(self, heading: Self) -> Self {
        let (cos, sin) = (heading.x, heading.y);
        Self::new(
            self.x.mul(cos) + self.y.mul(sin),
            self.y.mul(cos) - self.x.mul(sin),
        )
    }

    /// Rotate 90° clockwise
    #[inline]
    pub fn rotate_right(self) -> Self {
        Self::new(self.y, -self.x)
    }

    /// Component-wise fixed-point division
    #[inline]
    pub fn div_fixed(self, d: Fixed) -> Self {
        Self::new(self.x.div(d), self.y.div(d))
    }

    #[inline]
    pub fn half(self) -> Self {
        Self::new(self.x.half(), self.y.half())
    }

    /// Component-wise multiply by a plain integer
    #[inline]
    pub fn scale_int(self, n: i64) -> Self {
        Self::new(self.x.mul_int(n), self.y.mul_int(n))
    }

    /// Presentation-only conversion
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_f32(), self.y.to_f32())
    }
}

impl Add for Vec2d {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2d {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2d {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Vec2d {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2d {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}
