// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Voice volume, exposed as a dimmable light.

use std::sync::Arc;

use super::{CoreContext, FeatureModule, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::command::DeviceCommand;
use crate::error::Result;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};
use crate::types::Percentage;

/// Volume assumed before the first report and applied when unmuting.
pub const DEFAULT_VOLUME: Percentage = Percentage::clamped(50);

/// Sound volume control.
#[derive(Debug)]
pub struct VolumeFeature {
    ctx: Arc<CoreContext>,
    element: Option<Arc<UiElement>>,
}

impl VolumeFeature {
    /// Creates the control if the configuration asks for it.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let element = ctx
            .config()
            .sound_volume
            .then(|| ctx.element("SoundVolume", ElementKind::Lightbulb, "Sound Volume"));
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
        });

        if let Some(element) = &feature.element {
            bind_get(element, Characteristic::Brightness, &feature, Self::volume);
            bind_set(element, Characteristic::Brightness, &feature, |this, value| async move {
                this.set_volume(value.as_percentage()?).await
            });
            bind_get(element, Characteristic::On, &feature, |this| !this.volume().is_zero());
            bind_set(element, Characteristic::On, &feature, |this, value| async move {
                let volume = if value.as_bool()? { DEFAULT_VOLUME } else { Percentage::MIN };
                this.set_volume(volume).await
            });
        }
        feature
    }

    /// Returns the volume, 50 before the first report.
    #[must_use]
    pub fn volume(&self) -> Percentage {
        self.ctx
            .device()
            .status_i64(keys::SOUND_VOLUME)
            .map_or(DEFAULT_VOLUME, Percentage::clamped)
    }

    /// Sets the volume.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set_volume(&self, volume: Percentage) -> Result<()> {
        tracing::info!(device = %self.ctx.device().device_id(), %volume, "Set sound volume");
        self.ctx.device().send(DeviceCommand::SoundVolume(volume)).await
    }

    fn push(&self, volume: Percentage) {
        if let Some(element) = &self.element {
            element.update_value(Characteristic::Brightness, volume);
            element.update_value(Characteristic::On, !volume.is_zero());
        }
    }

    fn on_volume(&self, event: &StateChangeEvent) {
        if let Some(volume) = event.as_i64() {
            self.push(Percentage::clamped(volume));
        }
    }
}

impl FeatureModule for VolumeFeature {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        if self.element.is_none() {
            return Ok(());
        }
        self.push(self.volume());
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::key(keys::SOUND_VOLUME),
            Dedup::Distinct,
            Self::on_volume,
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

    #[test]
    fn defaults_to_half_volume() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        let feature = VolumeFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        let element = &feature.elements()[0];
        assert_eq!(element.int_value(Characteristic::Brightness), Some(50));
        assert!(element.bool_value(Characteristic::On));
    }

    #[tokio::test]
    async fn writes_clamp_and_mute() {
        let (ctx, fake) = testing::context(Config::default(), Capabilities::default());
        let _feature = VolumeFeature::new(&ctx);
        let accessory = ctx.accessory();

        accessory.handle_set("SoundVolume", Characteristic::Brightness, 150).await.unwrap();
        accessory.handle_set("SoundVolume", Characteristic::On, false).await.unwrap();
        accessory.handle_set("SoundVolume", Characteristic::On, true).await.unwrap();
        assert_eq!(
            fake.sent(),
            vec![
                DeviceCommand::SoundVolume(Percentage::MAX),
                DeviceCommand::SoundVolume(Percentage::MIN),
                DeviceCommand::SoundVolume(DEFAULT_VOLUME),
            ]
        );
    }

    #[test]
    fn zero_volume_reads_off() {
        let (ctx, _fake) = testing::context(Config::default(), Capabilities::default());
        let feature = VolumeFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();

        ctx.device().emit_state_change(keys::SOUND_VOLUME, json!(0));
        assert!(!feature.elements()[0].bool_value(Characteristic::On));
    }

    #[test]
    fn disabled_in_config() {
        let mut config = Config::default();
        config.sound_volume = false;
        let (ctx, _fake) = testing::context(config, Capabilities::default());
        assert!(VolumeFeature::new(&ctx).elements().is_empty());
    }
}
