//! Q48.16 fixed-point scalar
//!
//! A wrapper over [`I48F16`] (48 integer bits, 16 fractional bits). The
//! backing type widens products and quotients internally, so intermediate
//! results never overflow for values in simulation range. Division by zero
//! and square roots of non-positive values are total and yield zero.
//!
//! Serialized as the raw `i64` bit pattern so configs and snapshots stay
//! bit-exact.

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use fixed::types::I48F16;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional bits
pub const FRAC_BITS: u32 = 16;

/// Fixed-point scalar (raw value is `value * 2^16`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(I48F16);

impl Fixed {
    pub const ZERO: Self = Self::from_raw(0);
    pub const ONE: Self = Self::from_raw(1 << FRAC_BITS);
    pub const HALF: Self = Self::from_raw(1 << (FRAC_BITS - 1));
    pub const NEG_ONE: Self = Self::from_raw(-(1 << FRAC_BITS));

    /// Wrap a raw Q48.16 value
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(I48F16::from_bits(raw))
    }

    /// Convert a whole number
    #[inline]
    pub const fn from_int(n: i64) -> Self {
        Self::from_raw(n << FRAC_BITS)
    }

    /// `num / denom` without going through floats. Zero denominator yields zero.
    #[inline]
    pub fn from_ratio(num: i64, denom: i64) -> Self {
        Self::from_int(num).div(Self::from_int(denom))
    }

    /// Raw Q48.16 value
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0.to_bits()
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.raw() == 0
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Fixed-point product, rounded down
    #[inline]
    pub fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }

    /// Fixed-point quotient. Division by zero yields zero.
    #[inline]
    pub fn div(self, rhs: Self) -> Self {
        self.0.checked_div(rhs.0).map_or(Self::ZERO, Self)
    }

    /// Multiply by a plain integer (no rescaling)
    #[inline]
    pub fn mul_int(self, n: i64) -> Self {
        Self(self.0 * n)
    }

    /// Divide by a plain integer (truncating). Zero divisor yields zero.
    #[inline]
    pub fn div_int(self, n: i64) -> Self {
        self.0.checked_div_int(n).map_or(Self::ZERO, Self)
    }

    /// Halve by integer division of the raw value, matching `value / 2`
    #[inline]
    pub fn half(self) -> Self {
        self.div_int(2)
    }

    /// Integer floor of the value
    #[inline]
    pub fn floor_to_int(self) -> i64 {
        self.0.floor().to_num::<i64>()
    }

    /// Square root, rounded down. Non-positive input yields zero.
    pub fn sqrt(self) -> Self {
        if self.0 <= I48F16::ZERO {
            return Self::ZERO;
        }
        Self(self.0.sqrt())
    }

    /// Presentation-only conversion
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0.to_num::<f32>()
    }
}

impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.raw())
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_raw)
    }
}

impl Add for Fixed {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Fixed {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}
