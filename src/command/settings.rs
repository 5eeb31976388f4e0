// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structured command parameters.
//!
//! Some settings are reported as JSON objects rather than plain codes.
//! Writing one field means sending the whole object back, so these types
//! read the current report, change one field and keep the rest.

use chrono::{NaiveTime, Timelike};
use serde_json::{Map, Value, json};

use crate::quantize::{DeviceMode, DryerDuration, WashTowelMode};

/// A rectangular cleaning area in map coordinates.
///
/// Serialized the way the device expects it: `[x1, y1, x2, y2, repeats]`.
///
/// # Examples
///
/// ```
/// use roborock_bridge::command::Zone;
///
/// let zone: Zone = serde_json::from_str("[25000, 25000, 26000, 26000, 2]").unwrap();
/// assert_eq!(zone.repeats, 2);
/// assert_eq!(serde_json::to_string(&zone).unwrap(), "[25000,25000,26000,26000,2]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[i32; 5]", into = "[i32; 5]")]
pub struct Zone {
    /// Left edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Top edge.
    pub y2: i32,
    /// Number of passes.
    pub repeats: i32,
}

impl From<[i32; 5]> for Zone {
    fn from([x1, y1, x2, y2, repeats]: [i32; 5]) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            repeats,
        }
    }
}

impl From<Zone> for [i32; 5] {
    fn from(zone: Zone) -> Self {
        [zone.x1, zone.y1, zone.x2, zone.y2, zone.repeats]
    }
}

/// Do-not-disturb window.
///
/// Defaults to 22:00 - 08:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DndWindow {
    /// Start of the quiet period.
    pub start: NaiveTime,
    /// End of the quiet period.
    pub end: NaiveTime,
}

impl Default for DndWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
        }
    }
}

impl DndWindow {
    /// Creates a window.
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Reads the window from a `dnd_timer` report.
    ///
    /// Both the `start_hour`/`start_minute` field pairs and `"HH:MM"`
    /// strings under `start_time`/`end_time` are understood. Anything
    /// unreadable yields the default window.
    #[must_use]
    pub fn from_status(status: Option<&Value>) -> Self {
        let Some(Value::Object(obj)) = status else {
            return Self::default();
        };
        let start = read_time(obj, "start").unwrap_or(Self::default().start);
        let end = read_time(obj, "end").unwrap_or(Self::default().end);
        Self { start, end }
    }

    /// Returns `true` if a `dnd_timer` report says the window is active.
    #[must_use]
    pub fn is_enabled(status: Option<&Value>) -> bool {
        status
            .and_then(|v| v.get("enabled"))
            .and_then(Value::as_i64)
            == Some(1)
    }

    /// Returns the device parameters: start hour, start minute, end hour,
    /// end minute.
    #[must_use]
    pub fn params(&self) -> Value {
        json!([
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        ])
    }
}

fn read_time(obj: &Map<String, Value>, prefix: &str) -> Option<NaiveTime> {
    if let Some(text) = obj.get(&format!("{prefix}_time")).and_then(Value::as_str) {
        return NaiveTime::parse_from_str(text, "%H:%M").ok();
    }
    let hour = obj.get(&format!("{prefix}_hour")).and_then(Value::as_u64)?;
    let minute = obj
        .get(&format!("{prefix}_minute"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    NaiveTime::from_hms_opt(u32::try_from(hour).ok()?, u32::try_from(minute).ok()?, 0)
}

/// Carpet boost settings (`carpet_mode`).
///
/// Reported as a one-element array holding an object with an `enable` flag
/// and motor current thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct CarpetSettings(Map<String, Value>);

impl Default for CarpetSettings {
    fn default() -> Self {
        let mut map = Map::new();
        map.insert("enable".into(), json!(0));
        map.insert("stall_time".into(), json!(10));
        map.insert("current_low".into(), json!(400));
        map.insert("current_high".into(), json!(500));
        map.insert("current_integral".into(), json!(450));
        Self(map)
    }
}

impl CarpetSettings {
    /// Reads the settings from a `carpet_mode` report, falling back to the
    /// factory thresholds.
    #[must_use]
    pub fn from_status(status: Option<&Value>) -> Self {
        match status.and_then(first_object) {
            Some(obj) => Self(obj.clone()),
            None => Self::default(),
        }
    }

    /// Returns `true` if a `carpet_mode` report has boost enabled.
    #[must_use]
    pub fn is_enabled(status: Option<&Value>) -> bool {
        status
            .and_then(first_object)
            .and_then(|obj| obj.get("enable"))
            .and_then(Value::as_i64)
            == Some(1)
    }

    /// Returns a copy with the boost flag changed.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.0.insert("enable".into(), json!(i32::from(enabled)));
        self
    }

    /// Returns the device parameters.
    #[must_use]
    pub fn params(&self) -> Value {
        json!([Value::Object(self.0.clone())])
    }
}

fn first_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Array(items) => items.first().and_then(Value::as_object),
        Value::Object(obj) => Some(obj),
        _ => None,
    }
}

/// Mop dryer settings of the dock (`dryer_setting`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DryerSettings {
    /// Drying time.
    pub duration: DryerDuration,
    /// Dryer status flag kept from the report.
    pub status: i64,
}

impl DryerSettings {
    /// Reads the status flag from a `dryer_setting` report and applies a
    /// new duration.
    #[must_use]
    pub fn from_status(status: Option<&Value>, duration: DryerDuration) -> Self {
        let flag = status
            .and_then(|v| v.get("status"))
            .and_then(Value::as_i64)
            .filter(|s| *s != 0)
            .unwrap_or(1);
        Self {
            duration,
            status: flag,
        }
    }

    /// Returns the drying time code from a `dryer_setting` report.
    #[must_use]
    pub fn reported_dry_time(status: Option<&Value>) -> Option<i64> {
        status
            .and_then(|v| v.get("on"))
            .and_then(|on| on.get("dry_time"))
            .and_then(Value::as_i64)
    }

    /// Returns the device parameters.
    #[must_use]
    pub fn params(&self) -> Value {
        json!({ "on": { "dry_time": self.duration.code() }, "status": self.status })
    }
}

/// Returns the wash intensity code from a `wash_towel_mode` report.
///
/// The report is an object `{ "wash_mode": n }`; a bare number is accepted
/// as well.
#[must_use]
pub fn reported_wash_mode(status: Option<&Value>) -> Option<i64> {
    match status? {
        Value::Object(obj) => obj.get("wash_mode").and_then(Value::as_i64),
        other => other.as_i64(),
    }
}

pub(crate) fn wash_towel_params(mode: WashTowelMode) -> Value {
    json!({ "wash_mode": mode.code() })
}
