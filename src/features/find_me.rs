// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Find-me switch.

use std::sync::Arc;

use super::{CoreContext, FeatureModule};
use crate::accessory::{ElementKind, UiElement};
use crate::command::DeviceCommand;
use crate::error::Result;
use crate::momentary::MomentaryAction;

/// Momentary switch that makes the robot announce itself.
#[derive(Debug)]
pub struct FindMeFeature {
    element: Option<Arc<UiElement>>,
    action: Option<Arc<MomentaryAction>>,
}

impl FindMeFeature {
    /// Creates the switch if the configuration asks for it.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let config = ctx.config();
        let element = config
            .find_me
            .then(|| ctx.element("findMe", ElementKind::Switch, &config.find_me_name()));
        let action = element
            .as_ref()
            .map(|element| ctx.bind_momentary(element, DeviceCommand::FindMe));
        Arc::new(Self { element, action })
    }

    /// Returns the momentary action, if the switch exists.
    #[must_use]
    pub fn action(&self) -> Option<&Arc<MomentaryAction>> {
        self.action.as_ref()
    }
}

impl FeatureModule for FindMeFeature {
    fn name(&self) -> &'static str {
        "find_me"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.element.iter().cloned().collect()
    }
}
