// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Characteristic identifiers and values.

use std::fmt;

use crate::error::ValueError;
use crate::types::Percentage;

/// A readable and possibly writable property of a UI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Characteristic {
    /// Power / active state (switch, fan, lightbulb).
    On,
    /// Fan speed, 0-100.
    RotationSpeed,
    /// Lightbulb level, 0-100.
    Brightness,
    /// Occupancy sensor state, 0 or 1.
    OccupancyDetected,
    /// Contact sensor state, 0 detected, 1 not detected.
    ContactSensorState,
    /// Battery level, 0-100.
    BatteryLevel,
    /// 1 when the battery is low.
    StatusLowBattery,
    /// 1 when charging.
    ChargingState,
    /// Name given at creation.
    Name,
    /// Name chosen by the user, persisted across restarts.
    ConfiguredName,
    /// Accessory information.
    Manufacturer,
    /// Accessory information.
    Model,
    /// Accessory information.
    SerialNumber,
    /// Accessory information.
    FirmwareRevision,
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Value carried by a characteristic.
///
/// Hosts may send levels as integers or floats and switches as booleans or
/// 0/1, so the accessors are lenient about numeric representations.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Text(String),
}

impl CharacteristicValue {
    /// Interprets the value as a boolean. Non-zero numbers are `true`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidType` for text values.
    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Self::Bool(b) => Ok(*b),
            Self::Int(i) => Ok(*i != 0),
            Self::Float(f) => Ok(*f != 0.0),
            Self::Text(_) => Err(self.invalid("bool")),
        }
    }

    /// Interprets the value as a level, clamping into 0-100.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidType` for boolean and text values.
    pub fn as_percentage(&self) -> Result<Percentage, ValueError> {
        match self {
            Self::Int(i) => Ok(Percentage::clamped(*i)),
            Self::Float(f) => Ok(Percentage::from_f64(*f)),
            Self::Bool(_) | Self::Text(_) => Err(self.invalid("number")),
        }
    }

    /// Returns the value as an integer if it is numeric.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(f.round() as i64),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn invalid(&self, expected: &'static str) -> ValueError {
        ValueError::InvalidType {
            expected,
            actual: format!("{self:?}"),
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for CharacteristicValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u8> for CharacteristicValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Percentage> for CharacteristicValue {
    fn from(value: Percentage) -> Self {
        Self::Int(i64::from(value.value()))
    }
}

impl From<String> for CharacteristicValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
