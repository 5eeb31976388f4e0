// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-step settings exposed as dimmable lights.
//!
//! Brightness picks the mode through the matching quantization table. The
//! light itself is always on; switching it on again applies the table's
//! default mode.

use std::sync::Arc;

use serde_json::Value;

use super::{CoreContext, FeatureModule, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, CharacteristicValue, ElementKind, UiElement};
use crate::capabilities::Feature;
use crate::command::{DeviceCommand, DryerSettings, reported_wash_mode};
use crate::error::Result;
use crate::quantize::{CarpetCleanMode, DryerDuration, MopMode, WashTowelMode};
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};
use crate::types::Percentage;

/// A multi-step device setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Mop route.
    MopRoute,
    /// Carpet handling.
    CarpetClean,
    /// Mop wash intensity of the dock.
    WashIntensity,
    /// Mop drying time of the dock.
    DryerDuration,
}

impl Level {
    /// Every level, in element order.
    pub const ALL: [Self; 4] = [
        Self::MopRoute,
        Self::CarpetClean,
        Self::WashIntensity,
        Self::DryerDuration,
    ];

    /// Returns the element id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::MopRoute => "MopMode",
            Self::CarpetClean => "CarpetCleanMode",
            Self::WashIntensity => "WashTowelMode",
            Self::DryerDuration => "DryerDuration",
        }
    }

    const fn display_name(self) -> &'static str {
        match self {
            Self::MopRoute => "Mop Route",
            Self::CarpetClean => "Carpet Mode",
            Self::WashIntensity => "Wash Intensity",
            Self::DryerDuration => "Dryer Duration",
        }
    }

    /// Returns the status key the level follows.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MopRoute => keys::MOP_MODE,
            Self::CarpetClean => keys::CARPET_CLEAN_MODE,
            Self::WashIntensity => keys::WASH_TOWEL_MODE,
            Self::DryerDuration => keys::DRYER_SETTING,
        }
    }

    /// Returns the hardware feature the level needs.
    #[must_use]
    pub const fn feature(self) -> Feature {
        match self {
            Self::MopRoute => Feature::MopMode,
            Self::CarpetClean => Feature::CarpetMode,
            Self::WashIntensity => Feature::Washing,
            Self::DryerDuration => Feature::Drying,
        }
    }

    /// Reads the percentage from a status value.
    ///
    /// Missing or unknown values give the table default.
    #[must_use]
    pub fn percentage(self, status: Option<&Value>) -> Percentage {
        let reported = match self {
            Self::MopRoute => status
                .and_then(Value::as_i64)
                .map(|code| MopMode::TABLE.to_percentage(code)),
            Self::CarpetClean => status
                .and_then(carpet_clean_code)
                .map(|code| CarpetCleanMode::TABLE.to_percentage(code)),
            Self::WashIntensity => {
                reported_wash_mode(status).map(|code| WashTowelMode::TABLE.to_percentage(code))
            }
            Self::DryerDuration => DryerSettings::reported_dry_time(status)
                .map(|code| DryerDuration::TABLE.to_percentage(code)),
        };
        reported.unwrap_or_else(|| self.default_percentage())
    }

    /// Returns the percentage applied when the light is switched on.
    #[must_use]
    pub fn default_percentage(self) -> Percentage {
        match self {
            Self::MopRoute => MopMode::TABLE.default_percentage(),
            Self::CarpetClean => CarpetCleanMode::TABLE.default_percentage(),
            Self::WashIntensity => WashTowelMode::TABLE.default_percentage(),
            Self::DryerDuration => DryerDuration::TABLE.default_percentage(),
        }
    }

    /// Snaps `percentage` to the canonical percentage of its mode.
    #[must_use]
    pub fn snap(self, percentage: Percentage) -> Percentage {
        match self {
            Self::MopRoute => MopMode::TABLE.snap(percentage),
            Self::CarpetClean => CarpetCleanMode::TABLE.snap(percentage),
            Self::WashIntensity => WashTowelMode::TABLE.snap(percentage),
            Self::DryerDuration => DryerDuration::TABLE.snap(percentage),
        }
    }

    /// Builds the command selecting the mode for `percentage`.
    ///
    /// The dryer keeps the status flag of the current report.
    #[must_use]
    pub fn command(self, percentage: Percentage, status: Option<&Value>) -> DeviceCommand {
        match self {
            Self::MopRoute => DeviceCommand::MopMode(MopMode::TABLE.to_device_mode(percentage)),
            Self::CarpetClean => {
                DeviceCommand::CarpetCleanMode(CarpetCleanMode::TABLE.to_device_mode(percentage))
            }
            Self::WashIntensity => {
                DeviceCommand::WashTowelMode(WashTowelMode::TABLE.to_device_mode(percentage))
            }
            Self::DryerDuration => DeviceCommand::DryerSetting(DryerSettings::from_status(
                status,
                DryerDuration::TABLE.to_device_mode(percentage),
            )),
        }
    }
}

// Reported either bare or as `{ "carpet_clean_mode": n }`.
fn carpet_clean_code(value: &Value) -> Option<i64> {
    match value {
        Value::Object(obj) => obj.get("carpet_clean_mode").and_then(Value::as_i64),
        other => other.as_i64(),
    }
}

/// Level controls.
#[derive(Debug)]
pub struct LevelsFeature {
    ctx: Arc<CoreContext>,
    levels: Vec<(Level, Arc<UiElement>)>,
}

impl LevelsFeature {
    /// Creates a light for every level the robot supports.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let levels = if ctx.config().level_controls {
            Level::ALL
                .into_iter()
                .filter(|level| ctx.supports(level.feature()))
                .map(|level| {
                    let element = ctx.element(level.id(), ElementKind::Lightbulb, level.display_name());
                    (level, element)
                })
                .collect()
        } else {
            Vec::new()
        };
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            levels,
        });

        for (level, element) in &feature.levels {
            let level = *level;
            bind_get(element, Characteristic::Brightness, &feature, move |this| this.percentage(level));
            bind_set(element, Characteristic::Brightness, &feature, move |this, value| async move {
                this.set(level, value.as_percentage()?).await
            });
            element.on_get(Characteristic::On, || CharacteristicValue::Bool(true));
            bind_set(element, Characteristic::On, &feature, move |this, value| async move {
                if value.as_bool()? {
                    this.set(level, level.default_percentage()).await
                } else {
                    // The light cannot be switched off.
                    if let Some(element) = this.element(level) {
                        element.update_value(Characteristic::On, true);
                    }
                    Ok(())
                }
            });
        }
        feature
    }

    /// Returns the current percentage of a level.
    #[must_use]
    pub fn percentage(&self, level: Level) -> Percentage {
        level.percentage(self.ctx.device().status(level.key()).as_ref())
    }

    /// Selects the mode of a level.
    ///
    /// On success the light shows the percentage of the selected mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set(&self, level: Level, percentage: Percentage) -> Result<()> {
        let command = level.command(percentage, self.ctx.device().status(level.key()).as_ref());
        tracing::info!(
            device = %self.ctx.device().device_id(),
            setting = level.id(),
            %percentage,
            method = command.method(),
            "Setting level"
        );
        self.ctx.device().send(command).await?;
        if let Some(element) = self.element(level) {
            element.update_value(Characteristic::Brightness, level.snap(percentage));
        }
        Ok(())
    }

    fn element(&self, level: Level) -> Option<&Arc<UiElement>> {
        self.levels
            .iter()
            .find(|(candidate, _)| *candidate == level)
            .map(|(_, element)| element)
    }

    fn on_event(&self, event: &StateChangeEvent) {
        for (level, element) in &self.levels {
            if event.is(level.key()) {
                element.update_value(Characteristic::Brightness, level.percentage(Some(event.value())));
            }
        }
    }
}

impl FeatureModule for LevelsFeature {
    fn name(&self) -> &'static str {
        "levels"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        if self.levels.is_empty() {
            return Ok(());
        }
        for (level, element) in &self.levels {
            element.update_value(Characteristic::Brightness, self.percentage(*level));
            element.update_value(Characteristic::On, true);
        }
        let keys: Vec<&'static str> = self.levels.iter().map(|(level, _)| level.key()).collect();
        subscribe(&self.ctx, &self, KeyFilter::keys(keys), Dedup::Distinct, Self::on_event);
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.levels.iter().map(|(_, element)| Arc::clone(element)).collect()
    }
}
