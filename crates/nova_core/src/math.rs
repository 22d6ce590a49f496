//! Fixed-point math utilities for deterministic simulation.
//!
//! All travel, production and combat math uses fixed-point arithmetic
//! to ensure deterministic behavior across platforms. Floating-point
//! operations can produce different results on different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

use crate::planet::Coord;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Fixed-point 3D vector used for positions in space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec3Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Z coordinate.
    #[serde(with = "fixed_serde")]
    pub z: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec3Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
        z: Fixed::ZERO,
    };

    /// Convert integer planet coordinates to a fixed-point vector.
    #[must_use]
    pub fn from_coord(coord: Coord) -> Self {
        Self {
            x: Fixed::from_num(coord.x),
            y: Fixed::from_num(coord.y),
            z: Fixed::from_num(coord.z),
        }
    }

    /// Linearly interpolate between two vectors.
    ///
    /// `t` of 1 or greater yields exactly `other` - travel interpolation
    /// must land on the destination with no residue.
    #[must_use]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        if t >= Fixed::ONE {
            return other;
        }
        if t <= Fixed::ZERO {
            return self;
        }
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Square root of an integer squared distance, carrying 32 fractional
/// bits in the result.
///
/// Squared distances over the full `i32` coordinate range exceed what
/// [`Fixed`] can hold, so the input stays in wide integer math and
/// only the root enters fixed-point. Saturates at `Fixed::MAX` once
/// the true root exceeds the representable integer part.
#[must_use]
pub fn fixed_sqrt_int(value: u128) -> Fixed {
    // The shift that produces the fractional bits needs value < 2^62;
    // past that the root does not fit the integer part either way.
    if value >= 1 << 62 {
        return Fixed::MAX;
    }
    Fixed::from_bits(isqrt_u128(value << 64) as i64)
}

/// Floor integer square root by Newton's method.
fn isqrt_u128(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Start above the true root so the iteration descends onto it.
    let mut x = 1u128 << (128 - n.leading_zeros()).div_ceil(2);
    loop {
        let next = (x + n / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Raise a fixed-point number to a small integer power by repeated
/// multiplication. Deterministic substitute for a float `powi`.
#[must_use]
pub fn fixed_powi(base: Fixed, exp: u32) -> Fixed {
    let mut result = Fixed::ONE;
    for _ in 0..exp {
        result = result.saturating_mul(base);
    }
    result
}

impl std::ops::Add for Vec3Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Vec3Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_int_perfect_squares() {
        assert_eq!(fixed_sqrt_int(0), Fixed::ZERO);
        assert_eq!(fixed_sqrt_int(1), Fixed::ONE);
        assert_eq!(fixed_sqrt_int(25), Fixed::from_num(5));
        assert_eq!(fixed_sqrt_int(1_000_000), Fixed::from_num(1_000));
    }

    #[test]
    fn test_sqrt_int_fractional_precision() {
        let root = fixed_sqrt_int(2);
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!((root * root - Fixed::from_num(2)).abs() < epsilon, "got {root:?}");
    }

    #[test]
    fn test_sqrt_int_large_inputs_do_not_panic() {
        // A full-span axis difference squared three times over
        let span = u128::from(u32::MAX);
        let sq = 3 * span * span;
        assert_eq!(fixed_sqrt_int(sq), Fixed::MAX);
        assert_eq!(fixed_sqrt_int(u128::MAX), Fixed::MAX);

        // Just under the saturation cutoff still yields a real root
        let below = (1u128 << 62) - 1;
        assert!(fixed_sqrt_int(below) < Fixed::MAX);
        assert!(fixed_sqrt_int(below) > Fixed::from_num(2_000_000_000));
    }

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a, b);

        let result1 = a * Fixed::from_num(7);
        let result2 = b * Fixed::from_num(7);
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_vec3_lerp_midpoint() {
        let a = Vec3Fixed::ZERO;
        let b = Vec3Fixed::new(
            Fixed::from_num(10),
            Fixed::from_num(20),
            Fixed::from_num(30),
        );
        let mid = a.lerp(b, Fixed::from_num(0.5));
        assert_eq!(
            mid,
            Vec3Fixed::new(Fixed::from_num(5), Fixed::from_num(10), Fixed::from_num(15))
        );
    }

    #[test]
    fn test_vec3_lerp_terminal_is_exact() {
        let a = Vec3Fixed::new(Fixed::from_num(1), Fixed::from_num(2), Fixed::from_num(3));
        let b = Vec3Fixed::new(Fixed::from_num(7), Fixed::from_num(-4), Fixed::from_num(9));
        // Exactly the destination, no accumulated residue
        assert_eq!(a.lerp(b, Fixed::ONE), b);
        assert_eq!(a.lerp(b, Fixed::from_num(2)), b);
        assert_eq!(a.lerp(b, Fixed::ZERO), a);
    }

    #[test]
    fn test_fixed_powi() {
        assert_eq!(fixed_powi(Fixed::from_num(2), 0), Fixed::ONE);
        assert_eq!(fixed_powi(Fixed::from_num(2), 10), Fixed::from_num(1024));
        let g = fixed_powi(Fixed::from_num(1.5), 2);
        assert_eq!(g, Fixed::from_num(2.25));
    }
}
