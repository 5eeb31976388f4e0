// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone switches, one per configured zone.

use std::sync::Arc;

use super::{CoreContext, FeatureModule, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::command::{DeviceCommand, Zone};
use crate::error::Result;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};

/// Zone cleaning switches.
#[derive(Debug)]
pub struct ZonesFeature {
    ctx: Arc<CoreContext>,
    zones: Vec<Arc<UiElement>>,
}

impl ZonesFeature {
    /// Creates a switch `zone-<name>` for every configured zone.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let config = ctx.config();
        let zones = config
            .zones
            .iter()
            .map(|zone| {
                tracing::debug!(zone = %zone.name, areas = zone.zone.len(), "Creating zone switch");
                ctx.element(
                    &format!("zone-{}", zone.name),
                    ElementKind::Switch,
                    &config.clean_name(&zone.name),
                )
            })
            .collect();
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            zones,
        });

        for (element, zone) in feature.zones.iter().zip(&config.zones) {
            let areas = zone.zone.clone();
            bind_get(element, Characteristic::On, &feature, |this| {
                this.ctx.device().is_cleaning()
            });
            bind_set(element, Characteristic::On, &feature, move |this, value| {
                let areas = areas.clone();
                async move { this.set_zone_cleaning(value.as_bool()?, areas).await }
            });
        }
        feature
    }

    /// Starts cleaning `areas`, or sends the robot home.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set_zone_cleaning(&self, on: bool, areas: Vec<Zone>) -> Result<()> {
        let device = self.ctx.device();
        if on && !device.is_cleaning() {
            tracing::info!(device = %device.device_id(), areas = areas.len(), "Starting zone cleaning");
            device.send(DeviceCommand::ZonedClean(areas)).await
        } else if !on {
            device.send(DeviceCommand::ReturnToDock).await
        } else {
            Ok(())
        }
    }

    fn on_state(&self, event: &StateChangeEvent) {
        if event.state_code().is_cleaning() {
            return;
        }
        for element in &self.zones {
            element.update_value(Characteristic::On, false);
        }
    }
}

impl FeatureModule for ZonesFeature {
    fn name(&self) -> &'static str {
        "zones"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        if self.zones.is_empty() {
            return Ok(());
        }
        let cleaning = self.ctx.device().is_cleaning();
        for element in &self.zones {
            element.update_value(Characteristic::On, cleaning);
        }
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::key(keys::STATE),
            Dedup::None,
            Self::on_state,
        );
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.zones.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::features::testing;

    fn sofa() -> Vec<Zone> {
        vec![Zone::from([25000, 25000, 26000, 26000, 1])]
    }

    #[tokio::test]
    async fn zone_switch_cleans_zone() {
        let config = Config::default().with_zone("Sofa", sofa());
        let (ctx, fake) = testing::context(config, Capabilities::default());
        fake.set_status(keys::STATE, json!(8));
        let feature = ZonesFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        assert_eq!(feature.elements()[0].name(), "cleaning Sofa");

        ctx.accessory()
            .handle_set("zone-Sofa", Characteristic::On, true)
            .await
            .unwrap();
        ctx.accessory()
            .handle_set("zone-Sofa", Characteristic::On, false)
            .await
            .unwrap();
        assert_eq!(
            fake.sent(),
            vec![DeviceCommand::ZonedClean(sofa()), DeviceCommand::ReturnToDock]
        );
    }

    #[test]
    fn reset_when_cleaning_stops() {
        let config = Config::default().with_zone("Sofa", sofa()).with_zone("Hall", sofa());
        let (ctx, _fake) = testing::context(config, Capabilities::default());
        let feature = ZonesFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();

        for element in feature.elements() {
            element.update_value(Characteristic::On, true);
        }
        ctx.device().emit_state_change(keys::STATE, json!(17));
        assert!(feature.elements().iter().all(|e| e.bool_value(Characteristic::On)));

        ctx.device().emit_state_change(keys::STATE, json!(12));
        assert!(feature.elements().iter().all(|e| !e.bool_value(Characteristic::On)));
    }
}
