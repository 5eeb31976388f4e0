// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dock occupancy sensor.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{CoreContext, FeatureModule, bind_get, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::error::Result;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};

/// Occupancy sensor that detects the robot in its dock.
///
/// The robot counts as docked when its state says so or when it charges.
/// Only changes are pushed.
#[derive(Debug)]
pub struct DockFeature {
    ctx: Arc<CoreContext>,
    element: Option<Arc<UiElement>>,
    last: Mutex<Option<bool>>,
}

impl DockFeature {
    /// Creates the sensor if the configuration asks for it.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let config = ctx.config();
        let element = config
            .dock
            .then(|| ctx.element("dock", ElementKind::OccupancySensor, &config.dock_name()));
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
            last: Mutex::new(None),
        });
        if let Some(element) = &feature.element {
            bind_get(element, Characteristic::OccupancyDetected, &feature, Self::is_docked);
        }
        feature
    }

    /// Returns `true` while the robot is docked or charging.
    #[must_use]
    pub fn is_docked(&self) -> bool {
        let device = self.ctx.device();
        device.is_docked() || device.is_charging()
    }

    fn on_event(&self, event: &StateChangeEvent) {
        let device = self.ctx.device();
        let docked = if event.is(keys::STATE) {
            event.state_code().is_docked() || device.is_charging()
        } else {
            matches!(event.as_i64(), Some(1 | 2)) || device.is_docked()
        };
        self.push(docked);
    }

    fn push(&self, docked: bool) {
        let Some(element) = &self.element else {
            return;
        };
        {
            let mut last = self.last.lock();
            if *last == Some(docked) {
                return;
            }
            *last = Some(docked);
        }
        element.update_value(Characteristic::OccupancyDetected, docked);
        let message = if docked {
            "Robot was docked"
        } else {
            "Robot not anymore in dock"
        };
        tracing::info!(device = %self.ctx.device().device_id(), docked, "{message}");
    }
}

impl FeatureModule for DockFeature {
    fn name(&self) -> &'static str {
        "dock"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        if self.element.is_none() {
            return Ok(());
        }
        self.push(self.is_docked());
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::keys([keys::STATE, keys::CHARGE_STATUS]),
            Dedup::None,
            Self::on_event,
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
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::features::testing;

    #[test]
    fn occupancy_follows_state_and_charging() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::default());
        fake.set_status(keys::STATE, json!(5));
        let feature = DockFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let element = &feature.elements()[0];
        assert!(!element.bool_value(Characteristic::OccupancyDetected));

        ctx.device().emit_state_change(keys::STATE, json!(8));
        assert!(element.bool_value(Characteristic::OccupancyDetected));

        fake.set_status(keys::STATE, json!(3));
        ctx.device().emit_state_change(keys::CHARGE_STATUS, json!(1));
        assert!(element.bool_value(Characteristic::OccupancyDetected));

        fake.set_status(keys::CHARGE_STATUS, json!(0));
        ctx.device().emit_state_change(keys::STATE, json!(5));
        assert!(!element.bool_value(Characteristic::OccupancyDetected));
    }

    #[test]
    fn pushes_only_changes() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        let feature = DockFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let mut updates = ctx.accessory().subscribe();

        ctx.device().emit_state_change(keys::STATE, json!(8));
        ctx.device().emit_state_change(keys::STATE, json!(8));
        ctx.device().emit_state_change(keys::CHARGE_STATUS, json!(1));

        assert!(updates.try_recv().is_ok());
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn absent_when_disabled() {
        let mut config = Config::default();
        config.dock = false;
        let (ctx, _fake) = testing::context(config, Capabilities::default());
        let feature = DockFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        assert!(feature.elements().is_empty());
    }
}
