// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry envelopes pushed by the vendor transport.
//!
//! Status pushes arrive as `CloudMessage` or `LocalMessage` with a JSON
//! array payload whose first element maps telemetry keys to values:
//!
//! ```json
//! [{ "state": 5, "battery": 87 }]
//! ```
//!
//! A [`TelemetryUpdate`] splits such a payload into one
//! [`StateChangeEvent`] per present key, in payload order. A `HomeData`
//! message carries no values; it tells the bridge that the scene and room
//! lists may have changed.
//!
//! # Examples
//!
//! ```
//! use roborock_bridge::telemetry::{MessageSource, TelemetryUpdate};
//! use serde_json::json;
//!
//! let payload = json!([{ "state": 8, "battery": 100 }]);
//! let update = TelemetryUpdate::from_message("LocalMessage", &payload).unwrap();
//!
//! assert_eq!(update.source(), MessageSource::Local);
//! let keys: Vec<_> = update.changes().iter().map(|c| c.key()).collect();
//! assert_eq!(keys, ["state", "battery"]);
//!
//! assert!(TelemetryUpdate::from_message("HomeData", &payload).is_none());
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::ParseError;
use crate::state::StateChangeEvent;
use crate::subscription::StateBus;

/// Origin of a message from the vendor transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSource {
    /// Status push relayed by the vendor cloud.
    Cloud,
    /// Status push received on the local network.
    Local,
    /// Home data (scenes, rooms, product) was refreshed.
    HomeData,
}

impl MessageSource {
    /// Parses the transport's message identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CloudMessage" => Some(Self::Cloud),
            "LocalMessage" => Some(Self::Local),
            "HomeData" => Some(Self::HomeData),
            _ => None,
        }
    }

    /// Returns the transport's message identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "CloudMessage",
            Self::Local => "LocalMessage",
            Self::HomeData => "HomeData",
        }
    }

    /// Returns `true` for sources carrying telemetry values.
    #[must_use]
    pub const fn carries_status(&self) -> bool {
        matches!(self, Self::Cloud | Self::Local)
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status push split into per-key changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryUpdate {
    source: MessageSource,
    changes: Vec<StateChangeEvent>,
}

impl TelemetryUpdate {
    /// Decomposes a status push.
    ///
    /// Returns `None` for sources that carry no status and for payloads
    /// that are not an array starting with an object.
    #[must_use]
    pub fn from_message(source: &str, payload: &Value) -> Option<Self> {
        match Self::decode(source, payload) {
            Ok(update) => update,
            Err(err) => {
                tracing::debug!(source, error = %err, "Ignoring malformed telemetry");
                None
            }
        }
    }

    /// Parses and decomposes a status push given as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the text is not JSON and
    /// `ParseError::UnexpectedFormat` if a status payload has the wrong
    /// shape.
    pub fn parse(source: &str, payload: &str) -> Result<Option<Self>, ParseError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::decode(source, &value)
    }

    fn decode(source: &str, payload: &Value) -> Result<Option<Self>, ParseError> {
        let Some(source) = MessageSource::from_name(source).filter(MessageSource::carries_status) else {
            return Ok(None);
        };
        let Value::Array(items) = payload else {
            return Err(ParseError::UnexpectedFormat(format!(
                "{source} payload is not an array"
            )));
        };
        let changes = match items.first() {
            None => Vec::new(),
            Some(Value::Object(values)) => values
                .iter()
                .map(|(key, value)| StateChangeEvent::new(key.as_str(), value.clone()))
                .collect(),
            Some(_) => {
                return Err(ParseError::UnexpectedFormat(format!(
                    "{source} payload does not start with an object"
                )));
            }
        };
        Ok(Some(Self { source, changes }))
    }

    /// Returns where the push came from.
    #[must_use]
    pub fn source(&self) -> MessageSource {
        self.source
    }

    /// Returns the changes in payload order.
    #[must_use]
    pub fn changes(&self) -> &[StateChangeEvent] {
        &self.changes
    }

    /// Returns the number of changed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if the push carried no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Publishes every change on `bus`, in payload order.
    pub fn publish(&self, bus: &StateBus) {
        for change in &self.changes {
            bus.publish_event(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn source_names() {
        assert_eq!(MessageSource::from_name("CloudMessage"), Some(MessageSource::Cloud));
        assert_eq!(MessageSource::from_name("LocalMessage"), Some(MessageSource::Local));
        assert_eq!(MessageSource::from_name("HomeData"), Some(MessageSource::HomeData));
        assert_eq!(MessageSource::from_name("Other"), None);
        assert_eq!(MessageSource::Cloud.to_string(), "CloudMessage");
    }

    #[test]
    fn only_present_keys_in_order() {
        let payload = json!([{ "fan_power": 102, "state": 5, "battery": 40 }, { "ignored": 1 }]);
        let update = TelemetryUpdate::from_message("CloudMessage", &payload).unwrap();

        assert_eq!(update.len(), 3);
        let keys: Vec<_> = update.changes().iter().map(StateChangeEvent::key).collect();
        assert_eq!(keys, ["fan_power", "state", "battery"]);
        assert_eq!(update.changes()[1].as_i64(), Some(5));
    }

    #[test]
    fn empty_array_is_empty_update() {
        let update = TelemetryUpdate::from_message("LocalMessage", &json!([])).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn other_sources_ignored() {
        let payload = json!([{ "state": 5 }]);
        assert!(TelemetryUpdate::from_message("HomeData", &payload).is_none());
        assert!(TelemetryUpdate::from_message("Unknown", &payload).is_none());
    }

    #[test]
    fn malformed_payloads() {
        assert!(TelemetryUpdate::from_message("CloudMessage", &json!({ "state": 5 })).is_none());
        assert!(TelemetryUpdate::from_message("CloudMessage", &json!([5])).is_none());

        let err = TelemetryUpdate::parse("CloudMessage", "[1]").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedFormat(_)));
        let err = TelemetryUpdate::parse("CloudMessage", "not json").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
        assert!(TelemetryUpdate::parse("HomeData", "{}").unwrap().is_none());
    }

    #[test]
    fn publish_feeds_bus() {
        use std::sync::Arc;

        use parking_lot::Mutex;

        use crate::subscription::{Dedup, KeyFilter};

        let bus = StateBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(KeyFilter::Any, Dedup::None, move |event| {
            sink.lock().push(event.key().to_string());
        });

        TelemetryUpdate::parse("LocalMessage", r#"[{"battery": 90, "error_code": 0}]"#)
            .unwrap()
            .unwrap()
            .publish(&bus);
        assert_eq!(*seen.lock(), vec!["battery", "error_code"]);
    }
}
