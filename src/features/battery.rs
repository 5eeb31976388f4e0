// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery level, low-battery flag and charging state.

use std::sync::Arc;

use super::{CoreContext, FeatureModule, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::error::Result;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};
use crate::types::Percentage;

/// Levels below this count as low battery.
pub const LOW_BATTERY_THRESHOLD: u8 = 20;

/// Battery element.
#[derive(Debug)]
pub struct BatteryFeature {
    ctx: Arc<CoreContext>,
    element: Arc<UiElement>,
}

impl BatteryFeature {
    /// Creates the battery element.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let element = ctx.element("battery", ElementKind::Battery, &format!("{} Battery", ctx.config().name));
        Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
        })
    }

    fn push_level(&self, level: Percentage) {
        self.element.update_value(Characteristic::BatteryLevel, level);
        self.element
            .update_value(Characteristic::StatusLowBattery, level.value() < LOW_BATTERY_THRESHOLD);
    }

    fn push_charging(&self, charge_status: Option<i64>) {
        let charging = charge_status.is_some_and(|status| status != 0);
        self.element.update_value(Characteristic::ChargingState, charging);
    }

    fn on_event(&self, event: &StateChangeEvent) {
        if event.is(keys::BATTERY) {
            if let Some(level) = event.as_i64() {
                self.push_level(Percentage::clamped(level));
            }
        } else {
            self.push_charging(event.as_i64());
        }
    }
}

impl FeatureModule for BatteryFeature {
    fn name(&self) -> &'static str {
        "battery"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::keys([keys::BATTERY, keys::CHARGE_STATUS]),
            Dedup::Distinct,
            Self::on_event,
        );
        let device = self.ctx.device();
        self.push_level(device.battery());
        self.push_charging(device.status_i64(keys::CHARGE_STATUS));
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        vec![Arc::clone(&self.element)]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::features::testing;

    #[test]
    fn initial_values_from_snapshot() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::default());
        fake.set_status(keys::BATTERY, json!(15));
        fake.set_status(keys::CHARGE_STATUS, json!(1));
        let feature = BatteryFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();

        let element = &feature.elements()[0];
        assert_eq!(element.int_value(Characteristic::BatteryLevel), Some(15));
        assert!(element.bool_value(Characteristic::StatusLowBattery));
        assert!(element.bool_value(Characteristic::ChargingState));
    }

    #[test]
    fn repeated_level_is_pushed_once() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        let feature = BatteryFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let mut updates = ctx.accessory().subscribe();

        ctx.device().emit_state_change(keys::BATTERY, json!(80));
        ctx.device().emit_state_change(keys::BATTERY, json!(80));

        let level = updates.try_recv().unwrap();
        assert_eq!(level.characteristic, Characteristic::BatteryLevel);
        assert_eq!(level.value.as_i64(), Some(80));
        let low = updates.try_recv().unwrap();
        assert_eq!(low.characteristic, Characteristic::StatusLowBattery);
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));

        let element = &feature.elements()[0];
        assert!(!element.bool_value(Characteristic::StatusLowBattery));
    }

    #[test]
    fn charge_status_zero_is_not_charging() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        let feature = BatteryFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let element = &feature.elements()[0];

        ctx.device().emit_state_change(keys::CHARGE_STATUS, json!(2));
        assert!(element.bool_value(Characteristic::ChargingState));
        ctx.device().emit_state_change(keys::CHARGE_STATUS, json!(0));
        assert!(!element.bool_value(Characteristic::ChargingState));
    }
}
