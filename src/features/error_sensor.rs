// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error contact sensor.
//!
//! The sensor reads "contact detected" (0) while the robot is fine and
//! "contact not detected" (1) while it reports an error code, so an open
//! contact means trouble.

use std::sync::Arc;

use super::{CoreContext, FeatureModule, bind_get, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::error::Result;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};

/// Contact sensor state while the robot is fine.
const CONTACT_DETECTED: i64 = 0;

/// Contact sensor state while the robot reports an error.
const CONTACT_NOT_DETECTED: i64 = 1;

/// Error status sensor.
#[derive(Debug)]
pub struct ErrorSensorFeature {
    ctx: Arc<CoreContext>,
    element: Option<Arc<UiElement>>,
}

impl ErrorSensorFeature {
    /// Creates the sensor if the configuration asks for it.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let element = ctx
            .config()
            .error_sensor
            .then(|| ctx.element("ErrorStatus", ElementKind::ContactSensor, "Error Status"));
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
        });
        if let Some(element) = &feature.element {
            bind_get(element, Characteristic::ContactSensorState, &feature, |this| {
                contact_state(this.ctx.device().status_i64(keys::ERROR_CODE))
            });
        }
        feature
    }

    fn on_error(&self, event: &StateChangeEvent) {
        let code = event.as_i64();
        if let Some(element) = &self.element {
            if code.is_some_and(|code| code != 0) {
                tracing::warn!(device = %self.ctx.device().device_id(), error_code = ?code, "Robot reports an error");
            }
            element.update_value(Characteristic::ContactSensorState, contact_state(code));
        }
    }
}

fn contact_state(error_code: Option<i64>) -> i64 {
    match error_code {
        Some(code) if code != 0 => CONTACT_NOT_DETECTED,
        _ => CONTACT_DETECTED,
    }
}

impl FeatureModule for ErrorSensorFeature {
    fn name(&self) -> &'static str {
        "error_sensor"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        let Some(element) = &self.element else {
            return Ok(());
        };
        element.update_value(
            Characteristic::ContactSensorState,
            contact_state(self.ctx.device().status_i64(keys::ERROR_CODE)),
        );
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::key(keys::ERROR_CODE),
            Dedup::Distinct,
            Self::on_error,
        );
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.element.iter().cloned().collect()
    }
}
