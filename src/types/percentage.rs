// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Percentage type for level-style characteristics.
//!
//! Rotation speed, brightness and battery level are all percentages in the
//! accessory model. This type keeps them within 0-100 at construction time.

use std::fmt;

use crate::error::ValueError;

/// A level expressed as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use roborock_bridge::types::Percentage;
///
/// let p = Percentage::new(75).unwrap();
/// assert_eq!(p.value(), 75);
///
/// assert!(Percentage::new(101).is_err());
/// assert_eq!(Percentage::clamped(-5).value(), 0);
/// assert_eq!(Percentage::clamped(250).value(), 100);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Percentage(u8);

impl Percentage {
    /// 0%.
    pub const MIN: Self = Self(0);

    /// 100%.
    pub const MAX: Self = Self(100);

    /// Creates a new percentage.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a percentage, clamping any integer into 0-100.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn clamped(value: i64) -> Self {
        if value < 0 {
            Self(0)
        } else if value > 100 {
            Self(100)
        } else {
            Self(value as u8)
        }
    }

    /// Creates a percentage from a float, rounding to the nearest integer and
    /// clamping into 0-100. `NaN` becomes 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self(0);
        }
        Self::clamped(value.round().clamp(-1.0, 101.0) as i64)
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` for 0%.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Percentage {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_valid_range() {
        for v in 0..=100 {
            assert_eq!(Percentage::new(v).unwrap().value(), v);
        }
        assert!(Percentage::new(101).is_err());
    }

    #[test]
    fn percentage_clamped() {
        assert_eq!(Percentage::clamped(-20), Percentage::MIN);
        assert_eq!(Percentage::clamped(100), Percentage::MAX);
        assert_eq!(Percentage::clamped(1000), Percentage::MAX);
        assert_eq!(Percentage::clamped(42).value(), 42);
    }

    #[test]
    fn percentage_from_float() {
        assert_eq!(Percentage::from_f64(33.4).value(), 33);
        assert_eq!(Percentage::from_f64(66.5).value(), 67);
        assert_eq!(Percentage::from_f64(-3.0).value(), 0);
        assert_eq!(Percentage::from_f64(f64::NAN).value(), 0);
        assert_eq!(Percentage::from_f64(1e9).value(), 100);
    }

    #[test]
    fn percentage_display() {
        assert_eq!(Percentage::clamped(50).to_string(), "50%");
    }
}
