// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene switches.
//!
//! Every enabled scene of the vendor app becomes a momentary switch
//! `scene-<id>` that runs the scene. The set follows the device's scene
//! list through [`ScenesFeature::refresh`]. Switches the host restored from
//! an earlier run read off and refuse writes until the list confirms them.

use std::sync::{Arc, Weak};

use super::{CoreContext, FeatureModule};
use crate::accessory::{Characteristic, CharacteristicValue, ElementKind, UiElement, sanitize_name};
use crate::command::DeviceCommand;
use crate::device::Scene;
use crate::error::{Error, Result};
use crate::inventory::{InventoryReconciler, ReconcileOutcome};

/// Element id prefix of scene switches.
const SCENE_PREFIX: &str = "scene-";

/// Momentary scene switches.
#[derive(Debug)]
pub struct ScenesFeature {
    ctx: Arc<CoreContext>,
    scenes: Option<InventoryReconciler<Scene>>,
}

impl ScenesFeature {
    /// Creates the feature. Switches appear on the first refresh.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let scenes = ctx.config().scenes.then(|| {
            let weak: Weak<CoreContext> = Arc::downgrade(ctx);
            InventoryReconciler::new(
                Arc::clone(ctx.accessory()),
                SCENE_PREFIX,
                ElementKind::Switch,
                |scene: &Scene| sanitize_name(&scene.name),
                move |scene: &Scene, element: &Arc<UiElement>| {
                    if let Some(ctx) = weak.upgrade() {
                        ctx.bind_momentary(element, DeviceCommand::ExecuteScene(scene.id));
                    }
                },
            )
        });
        Arc::new(Self {
            ctx: Arc::clone(ctx),
            scenes,
        })
    }

    /// Returns the ids of the exposed scenes.
    #[must_use]
    pub fn scene_ids(&self) -> Vec<u64> {
        self.scenes
            .as_ref()
            .map(InventoryReconciler::ids)
            .unwrap_or_default()
    }

    /// Reconciles the switches against the device's scene list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the scene list cannot be fetched.
    pub async fn refresh(&self) -> Result<ReconcileOutcome> {
        let Some(scenes) = &self.scenes else {
            return Ok(ReconcileOutcome::default());
        };
        let listed = self.ctx.device().scenes().await?;
        Ok(scenes.reconcile(&listed))
    }
}

impl FeatureModule for ScenesFeature {
    fn name(&self) -> &'static str {
        "scenes"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        let accessory = self.ctx.accessory();
        let restored = accessory.element_ids_with_prefix(SCENE_PREFIX);
        if self.scenes.is_none() {
            for id in restored {
                tracing::debug!(element = %id, "Scenes disabled, removing restored switch");
                accessory.remove(id.as_str());
            }
            return Ok(());
        }
        for id in restored {
            let Some(element) = accessory.element(id.as_str()) else {
                continue;
            };
            if element.has_set_handler(Characteristic::On) {
                continue;
            }
            tracing::debug!(element = %id, "Restored scene switch awaits the scene list");
            element.update_value(Characteristic::On, false);
            element.on_get(Characteristic::On, || CharacteristicValue::Bool(false));
            let pending = id.to_string();
            element.on_set(Characteristic::On, move |_| {
                let id = pending.clone();
                async move { Err(Error::StaleReference { id }) }
            });
        }
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.scenes
            .as_ref()
            .map(InventoryReconciler::elements)
            .unwrap_or_default()
    }
}
