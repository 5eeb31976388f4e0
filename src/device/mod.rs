// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-control boundary.
//!
//! The bridge never talks to the robot directly. Transport, sessions and the
//! current status snapshot belong to a [`DeviceControl`] implementation
//! supplied by the caller. [`VacuumDevice`] wraps it together with the
//! device's [`StateBus`] and adds the derived state the feature modules
//! share (cleaning, paused, docked, charging).
//!
//! Status reads always go to the snapshot; nothing here caches telemetry.

#[cfg(test)]
pub(crate) mod fake;
mod items;

pub use items::{Room, Scene};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::command::DeviceCommand;
use crate::error::{CommandError, Result};
use crate::state::keys;
use crate::subscription::StateBus;
use crate::types::{Percentage, StateCode};

/// Access to one robot.
///
/// Snapshot reads are synchronous and must not block. Commands and
/// inventory listings are asynchronous and may fail.
#[async_trait]
pub trait DeviceControl: Send + Sync {
    /// Returns the device unique id.
    fn device_id(&self) -> &str;

    /// Returns the current value of a status key.
    fn status(&self, key: &str) -> Option<Value>;

    /// Returns a device info field (`name`, `sn`, `fv`, ...).
    fn info(&self, key: &str) -> Option<Value>;

    /// Returns a product attribute (`model`, ...).
    fn product_attribute(&self, key: &str) -> Option<Value>;

    /// Returns `true` if the model supports a feature.
    fn has_feature(&self, feature: &str) -> bool;

    /// Lists the scenes defined for the device.
    async fn scenes(&self) -> std::result::Result<Vec<Scene>, CommandError>;

    /// Lists the rooms of the current map.
    async fn room_list(&self) -> std::result::Result<Vec<Room>, CommandError>;

    /// Sends a command.
    async fn send(&self, command: &DeviceCommand) -> std::result::Result<(), CommandError>;
}

/// A robot together with its state bus.
pub struct VacuumDevice {
    control: Arc<dyn DeviceControl>,
    bus: StateBus,
}

impl VacuumDevice {
    /// Wraps a device-control implementation.
    #[must_use]
    pub fn new(control: Arc<dyn DeviceControl>) -> Self {
        Self {
            control,
            bus: StateBus::new(),
        }
    }

    /// Returns the device-control implementation.
    #[must_use]
    pub fn control(&self) -> &Arc<dyn DeviceControl> {
        &self.control
    }

    /// Returns the state bus of this device.
    #[must_use]
    pub fn bus(&self) -> &StateBus {
        &self.bus
    }

    /// Returns the device unique id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        self.control.device_id()
    }

    /// Publishes one telemetry change to the bus.
    pub fn emit_state_change(&self, key: impl Into<String>, value: Value) {
        self.bus.publish(key, value);
    }

    /// Returns the current value of a status key.
    #[must_use]
    pub fn status(&self, key: &str) -> Option<Value> {
        self.control.status(key)
    }

    /// Returns a status key as an integer.
    #[must_use]
    pub fn status_i64(&self, key: &str) -> Option<i64> {
        self.status(key).as_ref().and_then(Value::as_i64)
    }

    /// Returns a device info field as text.
    #[must_use]
    pub fn info_text(&self, key: &str) -> Option<String> {
        self.control.info(key).and_then(|v| value_text(&v))
    }

    /// Returns a product attribute as text.
    #[must_use]
    pub fn product_attribute_text(&self, key: &str) -> Option<String> {
        self.control.product_attribute(key).and_then(|v| value_text(&v))
    }

    /// Returns `true` if the model supports a feature.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.control.has_feature(feature)
    }

    /// Returns the operating state.
    #[must_use]
    pub fn state(&self) -> StateCode {
        StateCode::from_value(self.status(keys::STATE).as_ref())
    }

    /// Returns `true` while a cleaning job runs.
    #[must_use]
    pub fn is_cleaning(&self) -> bool {
        self.state().is_cleaning()
    }

    /// Returns `true` while a job is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    /// Returns `true` while the robot sits in the dock.
    #[must_use]
    pub fn is_docked(&self) -> bool {
        self.state().is_docked()
    }

    /// Returns `true` while the battery charges.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        matches!(self.status_i64(keys::CHARGE_STATUS), Some(1 | 2))
    }

    /// Returns the battery level, 0 when not reported yet.
    #[must_use]
    pub fn battery(&self) -> Percentage {
        Percentage::clamped(self.status_i64(keys::BATTERY).unwrap_or(0))
    }

    /// Sends a command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command or cannot
    /// be reached.
    pub async fn send(&self, command: DeviceCommand) -> Result<()> {
        tracing::debug!(
            device = %self.device_id(),
            method = command.method(),
            params = %command.params(),
            "Sending command"
        );
        self.control.send(&command).await.map_err(|err| {
            tracing::warn!(
                device = %self.device_id(),
                method = command.method(),
                error = %err,
                "Command failed"
            );
            err.into()
        })
    }

    /// Lists the scenes defined for the device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the listing fails.
    pub async fn scenes(&self) -> Result<Vec<Scene>> {
        Ok(self.control.scenes().await?)
    }

    /// Lists the rooms of the current map.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the listing fails.
    pub async fn room_list(&self) -> Result<Vec<Room>> {
        Ok(self.control.room_list().await?)
    }
}

impl fmt::Debug for VacuumDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VacuumDevice")
            .field("device_id", &self.device_id())
            .field("bus", &self.bus)
            .finish()
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use fake::FakeDevice;
    use serde_json::json;

    fn device(fake: &Arc<FakeDevice>) -> VacuumDevice {
        let control: Arc<dyn DeviceControl> = fake.clone();
        VacuumDevice::new(control)
    }

    #[test]
    fn derived_state_reads_snapshot() {
        let fake = Arc::new(FakeDevice::new());
        let device = device(&fake);

        assert_eq!(device.state(), StateCode::Unknown);
        assert!(!device.is_cleaning());

        fake.set_status(keys::STATE, json!(18));
        assert!(device.is_cleaning());

        fake.set_status(keys::STATE, json!(10));
        assert!(device.is_paused());
        assert!(!device.is_cleaning());

        fake.set_status(keys::STATE, json!(8));
        assert!(device.is_docked());
    }

    #[test]
    fn charging_and_battery() {
        let fake = Arc::new(FakeDevice::new());
        let device = device(&fake);
        assert!(!device.is_charging());
        assert_eq!(device.battery(), Percentage::MIN);

        fake.set_status(keys::CHARGE_STATUS, json!(2));
        fake.set_status(keys::BATTERY, json!(87));
        assert!(device.is_charging());
        assert_eq!(device.battery().value(), 87);
    }

    #[test]
    fn info_text_ignores_empty_values() {
        let fake = Arc::new(FakeDevice::new());
        fake.set_info("sn", json!(""));
        fake.set_info("fv", json!("02.16.12"));
        let device = device(&fake);
        assert_eq!(device.info_text("sn"), None);
        assert_eq!(device.info_text("fv").as_deref(), Some("02.16.12"));
    }

    #[tokio::test]
    async fn send_records_and_maps_errors() {
        let fake = Arc::new(FakeDevice::new());
        let device = device(&fake);

        device.send(DeviceCommand::FindMe).await.unwrap();
        assert_eq!(fake.sent(), vec![DeviceCommand::FindMe]);

        fake.fail_with(CommandError::Unavailable("offline".to_string()));
        let err = device.send(DeviceCommand::Start).await.unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::Unavailable(_))));
    }
}
