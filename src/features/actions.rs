// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot action switches: return to dock, spot clean, empty the dust bin
//! and wash the mop.

use std::sync::Arc;

use super::{CoreContext, FeatureModule};
use crate::accessory::{ElementKind, UiElement};
use crate::capabilities::Feature;
use crate::command::DeviceCommand;
use crate::error::Result;
use crate::momentary::MomentaryAction;

/// Momentary action switches.
#[derive(Debug)]
pub struct ActionsFeature {
    actions: Vec<(Arc<UiElement>, Arc<MomentaryAction>)>,
}

impl ActionsFeature {
    /// Creates the switches the configuration and the model allow.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let config = ctx.config();
        let mut wanted = Vec::new();
        if config.actions {
            wanted.push(("ReturnToDock", "Return to Dock", DeviceCommand::ReturnToDock));
            wanted.push(("SpotClean", "Spot Clean", DeviceCommand::SpotClean));
        }
        if config.dust_collection && ctx.supports(Feature::DustCollection) {
            wanted.push(("DustCollection", "Dust Collection", DeviceCommand::StartDustCollection));
        }
        if ctx.supports(Feature::Washing) {
            wanted.push(("MopWash", "Mop Washing", DeviceCommand::StartMopWash));
        }

        let actions = wanted
            .into_iter()
            .map(|(id, name, command)| {
                let element = ctx.element(id, ElementKind::Switch, name);
                let action = ctx.bind_momentary(&element, command);
                (element, action)
            })
            .collect();
        Arc::new(Self { actions })
    }

    /// Returns the momentary action behind an element id.
    #[must_use]
    pub fn action(&self, id: &str) -> Option<&Arc<MomentaryAction>> {
        self.actions
            .iter()
            .find(|(element, _)| element.id().as_str() == id)
            .map(|(_, action)| action)
    }
}

impl FeatureModule for ActionsFeature {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.actions.iter().map(|(element, _)| Arc::clone(element)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::accessory::Characteristic;
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::features::testing;

    fn ids(feature: &ActionsFeature) -> Vec<String> {
        feature
            .elements()
            .iter()
            .map(|element| element.id().as_str().to_string())
            .collect()
    }

    #[test]
    fn basic_model_gets_dock_and_spot() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        let feature = ActionsFeature::new(&ctx);
        assert_eq!(ids(&feature), vec!["ReturnToDock", "SpotClean"]);
    }

    #[test]
    fn dock_features_add_switches() {
        let config = Config::default().with_dust_collection(true);
        let (ctx, _fake) = testing::context(config, Capabilities::all());
        let feature = ActionsFeature::new(&ctx);
        assert_eq!(
            ids(&feature),
            vec!["ReturnToDock", "SpotClean", "DustCollection", "MopWash"]
        );

        let (ctx, _fake) = testing::context(Config::default(), Capabilities::all());
        let feature = ActionsFeature::new(&ctx);
        assert!(feature.action("DustCollection").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn switches_send_and_revert() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::all());
        let feature = ActionsFeature::new(&ctx);

        ctx.accessory()
            .handle_set("ReturnToDock", Characteristic::On, true)
            .await
            .unwrap();
        ctx.accessory()
            .handle_set("MopWash", Characteristic::On, true)
            .await
            .unwrap();
        ctx.accessory()
            .handle_set("SpotClean", Characteristic::On, false)
            .await
            .unwrap();
        assert_eq!(
            fake.sent(),
            vec![DeviceCommand::ReturnToDock, DeviceCommand::StartMopWash]
        );

        tokio::time::sleep(Duration::from_millis(1100)).await;
        for element in feature.elements() {
            assert!(!element.bool_value(Characteristic::On));
        }
    }
}
