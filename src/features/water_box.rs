// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Water flow of the mop, exposed as a fan.

use std::sync::Arc;

use super::{CoreContext, FeatureModule, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::capabilities::Feature;
use crate::command::DeviceCommand;
use crate::error::Result;
use crate::quantize::WaterMode;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};
use crate::types::Percentage;

/// Water box control.
///
/// Rotation speed maps onto the water modes; the fan is on whenever water
/// flows. Present when configured and supported by the model.
#[derive(Debug)]
pub struct WaterBoxFeature {
    ctx: Arc<CoreContext>,
    element: Option<Arc<UiElement>>,
}

impl WaterBoxFeature {
    /// Creates the control when enabled and supported.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let config = ctx.config();
        let element = (config.water_box && ctx.supports(Feature::WaterLevel))
            .then(|| ctx.element("waterBox", ElementKind::Fan, &config.water_box_name()));
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
        });

        if let Some(element) = &feature.element {
            bind_get(element, Characteristic::RotationSpeed, &feature, Self::speed);
            bind_set(element, Characteristic::RotationSpeed, &feature, |this, value| async move {
                this.set_speed(value.as_percentage()?).await
            });
            bind_get(element, Characteristic::On, &feature, |this| !this.speed().is_zero());
            bind_set(element, Characteristic::On, &feature, |this, value| async move {
                if value.as_bool()? {
                    Ok(())
                } else {
                    this.set_speed(Percentage::MIN).await
                }
            });
        }
        feature
    }

    /// Returns the water flow, 0 before the first report.
    #[must_use]
    pub fn speed(&self) -> Percentage {
        self.ctx
            .device()
            .status_i64(keys::WATER_BOX_MODE)
            .map_or(Percentage::MIN, |code| WaterMode::TABLE.to_percentage(code))
    }

    /// Sets the water flow, snapped to the selected mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set_speed(&self, speed: Percentage) -> Result<()> {
        let mode = WaterMode::TABLE.to_device_mode(speed);
        tracing::info!(device = %self.ctx.device().device_id(), %speed, ?mode, "Set water box mode");
        self.ctx.device().send(DeviceCommand::WaterBoxMode(mode)).await?;
        self.push(WaterMode::TABLE.mode_percentage(mode));
        Ok(())
    }

    fn push(&self, speed: Percentage) {
        if let Some(element) = &self.element {
            element.update_value(Characteristic::RotationSpeed, speed);
            element.update_value(Characteristic::On, !speed.is_zero());
        }
    }

    fn on_mode(&self, event: &StateChangeEvent) {
        if let Some(code) = event.as_i64() {
            tracing::debug!(code, "Water box mode changed");
            self.push(WaterMode::TABLE.to_percentage(code));
        }
    }
}

impl FeatureModule for WaterBoxFeature {
    fn name(&self) -> &'static str {
        "water_box"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        if self.element.is_none() {
            return Ok(());
        }
        self.push(self.speed());
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::key(keys::WATER_BOX_MODE),
            Dedup::Distinct,
            Self::on_mode,
        );
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.element.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::features::testing;

    fn supported() -> Capabilities {
        Capabilities::default().with(Feature::WaterLevel)
    }

    #[test]
    fn needs_config_and_feature() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        assert!(WaterBoxFeature::new(&ctx).elements().is_empty());

        let mut config = Config::default();
        config.water_box = false;
        let (ctx, _fake) = testing::context(config, supported());
        assert!(WaterBoxFeature::new(&ctx).elements().is_empty());

        let (ctx, _fake) = testing::context(Config::default(), supported());
        let feature = WaterBoxFeature::new(&ctx);
        assert_eq!(feature.elements()[0].name(), "Roborock Vacuum Water Box");
    }

    #[tokio::test]
    async fn writes_quantize_to_water_modes() {
        let (ctx, fake) = testing::context(Config::default(), supported());
        let feature = WaterBoxFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let accessory = ctx.accessory();

        accessory.handle_set("waterBox", Characteristic::RotationSpeed, 50).await.unwrap();
        accessory.handle_set("waterBox", Characteristic::RotationSpeed, 80).await.unwrap();
        accessory.handle_set("waterBox", Characteristic::On, true).await.unwrap();
        accessory.handle_set("waterBox", Characteristic::On, false).await.unwrap();
        assert_eq!(
            fake.sent(),
            vec![
                DeviceCommand::WaterBoxMode(WaterMode::Standard),
                DeviceCommand::WaterBoxMode(WaterMode::Intense),
                DeviceCommand::WaterBoxMode(WaterMode::Off),
            ]
        );
    }

    #[tokio::test]
    async fn writes_record_selected_mode() {
        let (ctx, _fake) = testing::context(Config::default(), supported());
        let feature = WaterBoxFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let element = &feature.elements()[0];

        ctx.accessory()
            .handle_set("waterBox", Characteristic::RotationSpeed, 20)
            .await
            .unwrap();
        assert_eq!(element.int_value(Characteristic::RotationSpeed), Some(33));
        assert!(element.bool_value(Characteristic::On));

        ctx.accessory()
            .handle_set("waterBox", Characteristic::RotationSpeed, 250)
            .await
            .unwrap();
        assert_eq!(element.int_value(Characteristic::RotationSpeed), Some(100));
    }

    #[test]
    fn telemetry_drives_speed_and_on() {
        let (ctx, _fake) = testing::context(Config::default(), supported());
        let feature = WaterBoxFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let element = &feature.elements()[0];
        assert!(!element.bool_value(Characteristic::On));

        ctx.device().emit_state_change(keys::WATER_BOX_MODE, json!(201));
        assert_eq!(element.int_value(Characteristic::RotationSpeed), Some(33));
        assert!(element.bool_value(Characteristic::On));

        ctx.device().emit_state_change(keys::WATER_BOX_MODE, json!(200));
        assert_eq!(element.int_value(Characteristic::RotationSpeed), Some(0));
        assert!(!element.bool_value(Characteristic::On));
    }
}
