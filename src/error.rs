// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Errors are contained per capability: a failing command reverts the
//! affected UI element and is reported to the host, a write aimed at an
//! inventory entry that has since disappeared is reported as a stale
//! reference, and missing telemetry never produces an error at all (the
//! feature modules fall back to documented defaults instead).

use thiserror::Error;

use crate::accessory::Characteristic;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A device command was rejected or could not be delivered.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// A write targeted an inventory entry that no longer exists.
    #[error("stale reference to removed element {id}")]
    StaleReference {
        /// The identifier of the removed element.
        id: String,
    },

    /// A characteristic value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Telemetry or configuration failed to parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The element has no write handler for this characteristic.
    #[error("characteristic {0:?} is not writable on this element")]
    UnsupportedCharacteristic(Characteristic),

    /// The configuration cannot work.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors reported by the device-control collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The device answered with an error.
    #[error("{method} rejected: {message}")]
    Rejected {
        /// The RPC method that was rejected.
        method: String,
        /// Message returned by the device or cloud.
        message: String,
    },

    /// No answer arrived in time.
    #[error("{method} timed out after {timeout_ms} ms")]
    Timeout {
        /// The RPC method that timed out.
        method: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The device is offline or the session is gone.
    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// Errors related to characteristic value validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// The value has the wrong type for the characteristic.
    #[error("expected {expected}, got {actual}")]
    InvalidType {
        /// Description of the expected type.
        expected: &'static str,
        /// Debug rendering of the received value.
        actual: String,
    },
}

/// Errors related to parsing telemetry and configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected message shape.
    #[error("unexpected format: {0}")]
    UnexpectedFormat(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::Rejected {
            method: "app_start".to_string(),
            message: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "app_start rejected: busy");

        let err = CommandError::Timeout {
            method: "find_me".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(err.to_string(), "find_me timed out after 5000 ms");
    }

    #[test]
    fn error_from_command_error() {
        let err: Error = CommandError::Unavailable("offline".to_string()).into();
        assert!(matches!(err, Error::Command(CommandError::Unavailable(_))));
    }

    #[test]
    fn stale_reference_display() {
        let err = Error::StaleReference {
            id: "room-16".to_string(),
        };
        assert_eq!(err.to_string(), "stale reference to removed element room-16");
    }
}
