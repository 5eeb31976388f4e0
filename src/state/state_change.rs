// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.

use serde_json::Value;

use crate::types::StateCode;

/// One telemetry field changing to a new value.
///
/// Events are immutable. Subscribers receive them by reference and two
/// events with the same key and value are interchangeable.
///
/// # Examples
///
/// ```
/// use roborock_bridge::state::StateChangeEvent;
/// use roborock_bridge::types::StateCode;
/// use serde_json::json;
///
/// let event = StateChangeEvent::new("state", json!(10));
/// assert_eq!(event.state_code(), StateCode::Paused);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateChangeEvent {
    key: String,
    value: Value,
}

impl StateChangeEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Returns the telemetry key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the reported value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns `true` if this event is for `key`.
    #[must_use]
    pub fn is(&self, key: &str) -> bool {
        self.key == key
    }

    /// Returns the value as an integer, if it is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    /// Interprets the value as an operating state code.
    #[must_use]
    pub fn state_code(&self) -> StateCode {
        StateCode::from_value(Some(&self.value))
    }

    /// Splits the event into key and value.
    #[must_use]
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors() {
        let event = StateChangeEvent::new("fan_power", json!(102));
        assert_eq!(event.key(), "fan_power");
        assert!(event.is("fan_power"));
        assert!(!event.is("state"));
        assert_eq!(event.as_i64(), Some(102));
    }

    #[test]
    fn identical_events_are_equal() {
        let a = StateChangeEvent::new("battery", json!(80));
        let b = StateChangeEvent::new("battery", json!(80));
        assert_eq!(a, b);
    }

    #[test]
    fn state_code_of_non_numeric_value_is_unknown() {
        let event = StateChangeEvent::new("state", json!({"x": 1}));
        assert_eq!(event.state_code(), StateCode::Unknown);
    }

    #[test]
    fn into_parts() {
        let (key, value) = StateChangeEvent::new("battery", json!(5)).into_parts();
        assert_eq!(key, "battery");
        assert_eq!(value, json!(5));
    }
}
