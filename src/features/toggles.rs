// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off device settings.
//!
//! Each [`Toggle`] is a switch whose state comes straight from one status
//! key. Writes for the do-not-disturb window and the carpet boost keep the
//! rest of the reported object and only flip the enabled flag.

use std::sync::Arc;

use serde_json::Value;

use super::{CoreContext, FeatureModule, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::capabilities::Feature;
use crate::command::{CarpetSettings, DeviceCommand, DndWindow};
use crate::error::Result;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};

/// A switchable device setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Status LED.
    Led,
    /// Dock flow LED.
    FlowLed,
    /// Child lock.
    ChildLock,
    /// Do-not-disturb window.
    DoNotDisturb,
    /// Carpet boost.
    CarpetBoost,
    /// Mop dryer of the dock.
    Dryer,
}

impl Toggle {
    /// Every toggle, in element order.
    pub const ALL: [Self; 6] = [
        Self::Led,
        Self::FlowLed,
        Self::ChildLock,
        Self::DoNotDisturb,
        Self::CarpetBoost,
        Self::Dryer,
    ];

    /// Returns the element id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Led => "LedStatus",
            Self::FlowLed => "FlowLed",
            Self::ChildLock => "ChildLock",
            Self::DoNotDisturb => "DoNotDisturb",
            Self::CarpetBoost => "CarpetMode",
            Self::Dryer => "Dryer",
        }
    }

    const fn display_name(self) -> &'static str {
        match self {
            Self::Led => "LED Status",
            Self::FlowLed => "Flow LED",
            Self::ChildLock => "Child Lock",
            Self::DoNotDisturb => "Do Not Disturb",
            Self::CarpetBoost => "Carpet Boost",
            Self::Dryer => "Dryer",
        }
    }

    /// Returns the status key the toggle follows.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Led => keys::LED_STATUS,
            Self::FlowLed => keys::FLOW_LED_STATUS,
            Self::ChildLock => keys::CHILD_LOCK_STATUS,
            Self::DoNotDisturb => keys::DND_TIMER,
            Self::CarpetBoost => keys::CARPET_MODE,
            Self::Dryer => keys::DRY_STATUS,
        }
    }

    /// Returns the hardware feature the toggle needs, if any.
    #[must_use]
    pub const fn feature(self) -> Option<Feature> {
        match self {
            Self::Led => Some(Feature::LedStatus),
            Self::FlowLed => Some(Feature::FlowLed),
            Self::ChildLock => Some(Feature::ChildLock),
            Self::DoNotDisturb => None,
            Self::CarpetBoost => Some(Feature::CarpetMode),
            Self::Dryer => Some(Feature::Drying),
        }
    }

    /// Reads the switch state from a status value. Missing means off.
    #[must_use]
    pub fn is_on(self, status: Option<&Value>) -> bool {
        match self {
            Self::DoNotDisturb => DndWindow::is_enabled(status),
            Self::CarpetBoost => CarpetSettings::is_enabled(status),
            Self::Led | Self::FlowLed | Self::ChildLock | Self::Dryer => {
                status.and_then(Value::as_i64) == Some(1)
            }
        }
    }

    /// Builds the command switching the setting, given its current status.
    #[must_use]
    pub fn command(self, on: bool, status: Option<&Value>) -> DeviceCommand {
        match self {
            Self::Led => DeviceCommand::LedStatus(on),
            Self::FlowLed => DeviceCommand::FlowLedStatus(on),
            Self::ChildLock => DeviceCommand::ChildLock(on),
            Self::DoNotDisturb if on => DeviceCommand::SetDndTimer(DndWindow::from_status(status)),
            Self::DoNotDisturb => DeviceCommand::CloseDndTimer,
            Self::CarpetBoost => {
                DeviceCommand::CarpetMode(CarpetSettings::from_status(status).with_enabled(on))
            }
            Self::Dryer => DeviceCommand::DryerStatus(on),
        }
    }
}

/// Device setting switches.
#[derive(Debug)]
pub struct TogglesFeature {
    ctx: Arc<CoreContext>,
    toggles: Vec<(Toggle, Arc<UiElement>)>,
}

impl TogglesFeature {
    /// Creates a switch for every setting the robot supports.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let toggles = if ctx.config().device_settings {
            Toggle::ALL
                .into_iter()
                .filter(|toggle| toggle.feature().is_none_or(|feature| ctx.supports(feature)))
                .map(|toggle| {
                    let element = ctx.element(toggle.id(), ElementKind::Switch, toggle.display_name());
                    (toggle, element)
                })
                .collect()
        } else {
            Vec::new()
        };
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            toggles,
        });

        for (toggle, element) in &feature.toggles {
            let toggle = *toggle;
            bind_get(element, Characteristic::On, &feature, move |this| this.is_on(toggle));
            bind_set(element, Characteristic::On, &feature, move |this, value| async move {
                this.set(toggle, value.as_bool()?).await
            });
        }
        feature
    }

    /// Returns the current state of a setting.
    #[must_use]
    pub fn is_on(&self, toggle: Toggle) -> bool {
        toggle.is_on(self.ctx.device().status(toggle.key()).as_ref())
    }

    /// Switches a setting.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set(&self, toggle: Toggle, on: bool) -> Result<()> {
        let command = toggle.command(on, self.ctx.device().status(toggle.key()).as_ref());
        tracing::info!(device = %self.ctx.device().device_id(), setting = toggle.id(), on, "Switching setting");
        self.ctx.device().send(command).await
    }

    fn on_event(&self, event: &StateChangeEvent) {
        for (toggle, element) in &self.toggles {
            if event.is(toggle.key()) {
                element.update_value(Characteristic::On, toggle.is_on(Some(event.value())));
            }
        }
    }
}

impl FeatureModule for TogglesFeature {
    fn name(&self) -> &'static str {
        "toggles"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        if self.toggles.is_empty() {
            return Ok(());
        }
        for (toggle, element) in &self.toggles {
            element.update_value(Characteristic::On, self.is_on(*toggle));
        }
        let keys: Vec<&'static str> = self.toggles.iter().map(|(toggle, _)| toggle.key()).collect();
        subscribe(&self.ctx, &self, KeyFilter::keys(keys), Dedup::Distinct, Self::on_event);
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.toggles.iter().map(|(_, element)| Arc::clone(element)).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::error::{CommandError, Error};
    use crate::features::testing;

    #[test]
    fn gated_on_features() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        let feature = TogglesFeature::new(&ctx);
        let ids: Vec<_> = feature.elements().iter().map(|e| e.id().as_str().to_string()).collect();
        assert_eq!(ids, vec!["DoNotDisturb"]);

        let (ctx, _fake) = testing::context(Config::default(), Capabilities::all());
        assert_eq!(TogglesFeature::new(&ctx).elements().len(), 6);

        let mut config = Config::default();
        config.device_settings = false;
        let (ctx, _fake) = testing::context(config, Capabilities::all());
        assert!(TogglesFeature::new(&ctx).elements().is_empty());
    }

    #[test]
    fn reads_follow_status() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::all());
        fake.set_status(keys::LED_STATUS, json!(1));
        fake.set_status(keys::DND_TIMER, json!({ "enabled": 1, "start_hour": 23, "start_minute": 0, "end_hour": 7, "end_minute": 0 }));
        fake.set_status(keys::CARPET_MODE, json!([{ "enable": 0, "current_high": 500 }]));
        let feature = TogglesFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();

        assert!(feature.is_on(Toggle::Led));
        assert!(feature.is_on(Toggle::DoNotDisturb));
        assert!(!feature.is_on(Toggle::CarpetBoost));
        assert!(!feature.is_on(Toggle::ChildLock));

        ctx.device().emit_state_change(keys::CHILD_LOCK_STATUS, json!(1));
        let lock = ctx.accessory().element("ChildLock").unwrap();
        assert!(lock.bool_value(Characteristic::On));
    }

    #[tokio::test]
    async fn carpet_write_keeps_thresholds() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::all());
        fake.set_status(keys::CARPET_MODE, json!([{ "enable": 0, "current_high": 700 }]));
        let _feature = TogglesFeature::new(&ctx);

        ctx.accessory()
            .handle_set("CarpetMode", Characteristic::On, true)
            .await
            .unwrap();
        let sent = fake.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].params(),
            json!([{ "enable": 1, "current_high": 700 }])
        );
    }

    #[tokio::test]
    async fn dnd_opens_and_closes_window() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::default());
        let _feature = TogglesFeature::new(&ctx);

        ctx.accessory()
            .handle_set("DoNotDisturb", Characteristic::On, true)
            .await
            .unwrap();
        ctx.accessory()
            .handle_set("DoNotDisturb", Characteristic::On, false)
            .await
            .unwrap();
        assert_eq!(
            fake.sent(),
            vec![
                DeviceCommand::SetDndTimer(DndWindow::default()),
                DeviceCommand::CloseDndTimer,
            ]
        );
    }

    #[tokio::test]
    async fn rejected_write_reverts() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::all());
        let feature = TogglesFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        fake.fail_with(CommandError::Rejected {
            method: "set_led_status".to_string(),
            message: "busy".to_string(),
        });

        let err = ctx
            .accessory()
            .handle_set("LedStatus", Characteristic::On, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Command(_)));
        let led = ctx.accessory().element("LedStatus").unwrap();
        assert!(!led.bool_value(Characteristic::On));
    }
}
