// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Main cleaning control.
//!
//! Exposed as a fan (on/off plus suction power as rotation speed) or as a
//! plain switch, depending on [`MainServiceType`]. Turning it on starts a
//! job: the selected rooms when the rooms module has a selection, the whole
//! map otherwise. Turning it off sends the robot home.

use std::sync::Arc;

use super::{CoreContext, FeatureModule, RoomsFeature, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, CharacteristicValue, ElementKind, UiElement};
use crate::command::DeviceCommand;
use crate::config::MainServiceType;
use crate::error::Result;
use crate::quantize::FanPower;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};
use crate::types::Percentage;

/// Main on/off control with optional suction power.
#[derive(Debug)]
pub struct CleaningFeature {
    ctx: Arc<CoreContext>,
    element: Arc<UiElement>,
    rooms: Option<Arc<RoomsFeature>>,
}

impl CleaningFeature {
    /// Creates the main element.
    ///
    /// `rooms` supplies the room selection used when cleaning starts.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>, rooms: Option<Arc<RoomsFeature>>) -> Arc<Self> {
        let config = ctx.config();
        let kind = match config.service_type {
            MainServiceType::Fan => ElementKind::Fan,
            MainServiceType::Switch => ElementKind::Switch,
        };
        let element = ctx.element("main", kind, &config.name);
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
            rooms,
        });

        bind_get(&feature.element, Characteristic::On, &feature, |this| {
            this.ctx.device().is_cleaning()
        });
        bind_set(&feature.element, Characteristic::On, &feature, |this, value| async move {
            this.set_cleaning(value.as_bool()?).await
        });
        if feature.has_speed() {
            bind_get(&feature.element, Characteristic::RotationSpeed, &feature, Self::speed);
            bind_set(
                &feature.element,
                Characteristic::RotationSpeed,
                &feature,
                |this, value| async move { this.set_speed(value.as_percentage()?).await },
            );
        }
        feature
    }

    /// Starts or stops cleaning.
    ///
    /// Starting while a job runs and stopping while idle do nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set_cleaning(&self, on: bool) -> Result<()> {
        let device = self.ctx.device();
        tracing::info!(device = %device.device_id(), on, "Set cleaning");
        if on && !device.is_cleaning() {
            let rooms = self
                .rooms
                .as_ref()
                .map(|rooms| rooms.selected_rooms())
                .unwrap_or_default();
            self.ctx.start_cleaning(rooms).await
        } else if !on && (device.is_cleaning() || device.is_paused()) {
            device.send(DeviceCommand::ReturnToDock).await?;
            tracing::info!(device = %device.device_id(), "Stopped cleaning, returning to dock");
            Ok(())
        } else {
            Ok(())
        }
    }

    /// Sets the suction power.
    ///
    /// On success the element shows the percentage of the selected mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set_speed(&self, speed: Percentage) -> Result<()> {
        let mode = FanPower::TABLE.to_device_mode(speed);
        tracing::info!(device = %self.ctx.device().device_id(), %speed, ?mode, "Set fan power");
        self.ctx.device().send(DeviceCommand::FanPower(mode)).await?;
        if self.has_speed() {
            self.element
                .update_value(Characteristic::RotationSpeed, FanPower::TABLE.mode_percentage(mode));
        }
        Ok(())
    }

    /// Returns the suction power, 0 before the first report.
    #[must_use]
    pub fn speed(&self) -> Percentage {
        self.ctx
            .device()
            .status_i64(keys::FAN_POWER)
            .map_or(Percentage::MIN, |code| FanPower::TABLE.to_percentage(code))
    }

    fn has_speed(&self) -> bool {
        self.ctx.config().service_type == MainServiceType::Fan
    }

    fn on_event(&self, event: &StateChangeEvent) {
        if event.is(keys::STATE) {
            let state = event.state_code();
            tracing::debug!(state = %state.label(), cleaning = state.is_cleaning(), "State changed");
            self.element.update_value(Characteristic::On, state.is_cleaning());
        } else if event.is(keys::FAN_POWER) && self.has_speed() {
            if let Some(code) = event.as_i64() {
                self.element
                    .update_value(Characteristic::RotationSpeed, FanPower::TABLE.to_percentage(code));
            }
        }
    }
}

impl FeatureModule for CleaningFeature {
    fn name(&self) -> &'static str {
        "main"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::keys([keys::STATE, keys::FAN_POWER]),
            Dedup::Distinct,
            Self::on_event,
        );
        self.element
            .update_value(Characteristic::On, self.ctx.device().is_cleaning());
        if self.has_speed() {
            self.element
                .update_value(Characteristic::RotationSpeed, CharacteristicValue::from(self.speed()));
        }
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        vec![Arc::clone(&self.element)]
    }
}
