// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pause switch.
//!
//! The switch is on while a job runs and can be paused. Turning it off
//! pauses; turning it back on resumes the selected rooms, or the whole map.

use std::sync::Arc;

use super::{CoreContext, FeatureModule, RoomsFeature, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement};
use crate::command::DeviceCommand;
use crate::error::Result;
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};
use crate::types::StateCode;

/// Pause/resume switch, present when enabled in the configuration.
#[derive(Debug)]
pub struct PauseFeature {
    ctx: Arc<CoreContext>,
    element: Option<Arc<UiElement>>,
    rooms: Option<Arc<RoomsFeature>>,
}

impl PauseFeature {
    /// Creates the pause switch if the configuration asks for it.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>, rooms: Option<Arc<RoomsFeature>>) -> Arc<Self> {
        let config = ctx.config();
        let element = config
            .pause
            .then(|| ctx.element("pause", ElementKind::Switch, &config.pause_name()));
        let feature = Arc::new(Self {
            ctx: Arc::clone(ctx),
            element,
            rooms,
        });

        if let Some(element) = &feature.element {
            bind_get(element, Characteristic::On, &feature, |this| {
                can_be_paused(this.ctx.device().state())
            });
            bind_set(element, Characteristic::On, &feature, |this, value| async move {
                this.set_running(value.as_bool()?).await
            });
        }
        feature
    }

    /// Resumes (`true`) or pauses (`false`) the current job.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn set_running(&self, running: bool) -> Result<()> {
        let device = self.ctx.device();
        tracing::info!(device = %device.device_id(), running, "Set pause state");
        if running && device.is_paused() {
            // A paused report clears the room selection, so this resumes
            // the whole map unless rooms were picked after the pause.
            let rooms = self
                .rooms
                .as_ref()
                .map(|rooms| rooms.selected_rooms())
                .unwrap_or_default();
            self.ctx.start_cleaning(rooms).await
        } else if !running && device.is_cleaning() {
            device.send(DeviceCommand::Pause).await?;
            tracing::info!(device = %device.device_id(), "Paused cleaning");
            Ok(())
        } else {
            Ok(())
        }
    }

    fn on_state(&self, event: &StateChangeEvent) {
        if let Some(element) = &self.element {
            element.update_value(Characteristic::On, can_be_paused(event.state_code()));
        }
    }
}

fn can_be_paused(state: StateCode) -> bool {
    state.is_cleaning() && !state.is_paused()
}

impl FeatureModule for PauseFeature {
    fn name(&self) -> &'static str {
        "pause"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        let Some(element) = &self.element else {
            return Ok(());
        };
        element.update_value(Characteristic::On, can_be_paused(self.ctx.device().state()));
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::key(keys::STATE),
            Dedup::Distinct,
            Self::on_state,
        );
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.element.iter().cloned().collect()
    }
}
