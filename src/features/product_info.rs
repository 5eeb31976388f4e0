// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Manufacturer, model, serial number and firmware version.

use std::sync::Arc;

use super::{CoreContext, FeatureModule};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::error::Result;

/// Manufacturer reported for every robot.
pub const MANUFACTURER: &str = "Roborock";

/// Placeholder for details the device does not report.
pub const UNKNOWN: &str = "Unknown";

/// Accessory information element.
#[derive(Debug)]
pub struct ProductInfoFeature {
    ctx: Arc<CoreContext>,
    element: Arc<UiElement>,
}

impl ProductInfoFeature {
    /// Creates the information element.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let element = ctx.element("info", ElementKind::AccessoryInformation, &ctx.config().name);
        Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
        })
    }
}

impl FeatureModule for ProductInfoFeature {
    fn name(&self) -> &'static str {
        "product_info"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        let device = self.ctx.device();
        let or_unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());

        self.element.update_value(Characteristic::Manufacturer, MANUFACTURER);
        self.element
            .update_value(Characteristic::Model, or_unknown(device.product_attribute_text("model")));
        self.element
            .update_value(Characteristic::SerialNumber, or_unknown(device.info_text("sn")));
        self.element
            .update_value(Characteristic::FirmwareRevision, or_unknown(device.info_text("fv")));
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        vec![Arc::clone(&self.element)]
    }
}
