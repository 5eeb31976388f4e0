// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device composition of the feature modules.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::accessory::{Accessory, UiElement};
use crate::capabilities::Capabilities;
use crate::config::Config;
use crate::device::{DeviceControl, VacuumDevice};
use crate::error::Result;
use crate::features::{
    ActionsFeature, BatteryFeature, CleaningFeature, CoreContext, DockFeature, ErrorSensorFeature,
    FeatureModule, FindMeFeature, LevelsFeature, PauseFeature, ProductInfoFeature, RoomsFeature,
    ScenesFeature, TogglesFeature, VolumeFeature, WaterBoxFeature, ZonesFeature,
};
use crate::inventory::ReconcileOutcome;
use crate::telemetry::{MessageSource, TelemetryUpdate};

/// One robot vacuum exposed as an accessory.
///
/// Builds the shared [`CoreContext`], creates every feature module and
/// routes inbound messages from the vendor transport to the device's
/// state bus.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use roborock_bridge::accessory::{Accessory, MemoryNameStore};
/// use roborock_bridge::device::DeviceControl;
/// use roborock_bridge::{Config, VacuumAccessory};
/// use serde_json::json;
///
/// # async fn run(control: Arc<dyn DeviceControl>) -> roborock_bridge::Result<()> {
/// let config = Config::from_json(r#"{ "name": "Robbie", "pause": true }"#)?;
/// let accessory = Arc::new(Accessory::new(
///     control.device_id(),
///     config.name.clone(),
///     Arc::new(MemoryNameStore::new()),
/// ));
///
/// let vacuum = VacuumAccessory::new(config, control, accessory)?;
/// vacuum.start().await?;
///
/// vacuum.notify_device_update("CloudMessage", &json!([{ "state": 5 }]));
/// # Ok(())
/// # }
/// ```
pub struct VacuumAccessory {
    ctx: Arc<CoreContext>,
    rooms: Arc<RoomsFeature>,
    scenes: Arc<ScenesFeature>,
    modules: Vec<Arc<dyn FeatureModule>>,
    initialized: AtomicBool,
}

impl VacuumAccessory {
    /// Creates the accessory, probing the robot's capabilities.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(config: Config, control: Arc<dyn DeviceControl>, accessory: Arc<Accessory>) -> Result<Self> {
        let capabilities = Capabilities::detect(control.as_ref());
        Self::with_capabilities(config, control, accessory, capabilities)
    }

    /// Creates the accessory with known capabilities.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn with_capabilities(
        config: Config,
        control: Arc<dyn DeviceControl>,
        accessory: Arc<Accessory>,
        capabilities: Capabilities,
    ) -> Result<Self> {
        config.validate()?;
        let device = VacuumDevice::new(control);
        tracing::info!(
            device = %device.device_id(),
            accessory = %accessory.id(),
            name = %config.name,
            "Composing vacuum accessory"
        );
        let ctx = Arc::new(CoreContext::new(config, device, accessory, capabilities));

        let rooms = RoomsFeature::new(&ctx);
        let scenes = ScenesFeature::new(&ctx);
        let modules: Vec<Arc<dyn FeatureModule>> = vec![
            ProductInfoFeature::new(&ctx),
            CleaningFeature::new(&ctx, Some(Arc::clone(&rooms))),
            PauseFeature::new(&ctx, Some(Arc::clone(&rooms))),
            DockFeature::new(&ctx),
            FindMeFeature::new(&ctx),
            WaterBoxFeature::new(&ctx),
            Arc::clone(&rooms) as Arc<dyn FeatureModule>,
            ZonesFeature::new(&ctx),
            BatteryFeature::new(&ctx),
            Arc::clone(&scenes) as Arc<dyn FeatureModule>,
            ActionsFeature::new(&ctx),
            ErrorSensorFeature::new(&ctx),
            TogglesFeature::new(&ctx),
            LevelsFeature::new(&ctx),
            VolumeFeature::new(&ctx),
        ];

        Ok(Self {
            ctx,
            rooms,
            scenes,
            modules,
            initialized: AtomicBool::new(false),
        })
    }

    /// Starts every module.
    ///
    /// A module that fails is logged and skipped; the others still start.
    /// Returns the number of modules that started. Later calls do nothing
    /// and return 0.
    pub fn init(&self) -> usize {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let mut started = 0;
        for module in &self.modules {
            match Arc::clone(module).init() {
                Ok(()) => started += 1,
                Err(err) => tracing::error!(
                    device = %self.ctx.device().device_id(),
                    module = module.name(),
                    error = %err,
                    "Feature module failed to start"
                ),
            }
        }
        tracing::debug!(
            device = %self.ctx.device().device_id(),
            started,
            elements = self.ctx.accessory().len(),
            "Vacuum accessory initialized"
        );
        started
    }

    /// Starts every module, then brings the scene and room switches in
    /// line with the device.
    ///
    /// Returns the number of modules started by this call.
    ///
    /// # Errors
    ///
    /// Returns the first listing error. The modules are running either way.
    pub async fn start(&self) -> Result<usize> {
        let started = self.init();
        self.refresh_inventories().await?;
        Ok(started)
    }

    /// Routes a status push to the state bus.
    ///
    /// Publishes one event per key present in the payload. Returns `false`
    /// when the message carries no status.
    pub fn notify_device_update(&self, source: &str, payload: &Value) -> bool {
        let Some(update) = TelemetryUpdate::from_message(source, payload) else {
            return false;
        };
        tracing::debug!(
            device = %self.ctx.device().device_id(),
            source = %update.source(),
            keys = update.len(),
            "Telemetry received"
        );
        update.publish(self.ctx.device().bus());
        true
    }

    /// Handles any message from the vendor transport.
    ///
    /// Status pushes go to the bus; `HomeData` refreshes the scene and room
    /// switches. Unknown sources are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if an inventory refresh fails.
    pub async fn handle_message(&self, source: &str, payload: &Value) -> Result<()> {
        match MessageSource::from_name(source) {
            Some(MessageSource::HomeData) => self.refresh_inventories().await,
            Some(_) => {
                self.notify_device_update(source, payload);
                Ok(())
            }
            None => {
                tracing::trace!(source, "Ignoring message");
                Ok(())
            }
        }
    }

    /// Brings the scene and room switches in line with the device.
    ///
    /// Both inventories are refreshed even when one fails.
    ///
    /// # Errors
    ///
    /// Returns the first listing error.
    pub async fn refresh_inventories(&self) -> Result<()> {
        let scenes = self.scenes.refresh().await;
        let rooms = self.rooms.refresh().await;
        self.log_refresh("scenes", &scenes);
        self.log_refresh("rooms", &rooms);
        scenes?;
        rooms?;
        Ok(())
    }

    fn log_refresh(&self, inventory: &'static str, result: &Result<ReconcileOutcome>) {
        let device = self.ctx.device().device_id();
        match result {
            Ok(outcome) if !outcome.is_unchanged() => tracing::info!(
                device = %device,
                inventory,
                added = outcome.added.len(),
                removed = outcome.removed.len(),
                "Inventory updated"
            ),
            Ok(_) => {}
            Err(err) => tracing::warn!(device = %device, inventory, error = %err, "Inventory refresh failed"),
        }
    }

    /// Returns the shared context.
    #[must_use]
    pub fn context(&self) -> &Arc<CoreContext> {
        &self.ctx
    }

    /// Returns the device.
    #[must_use]
    pub fn device(&self) -> &VacuumDevice {
        self.ctx.device()
    }

    /// Returns the host accessory.
    #[must_use]
    pub fn accessory(&self) -> &Arc<Accessory> {
        self.ctx.accessory()
    }

    /// Returns the room selection module.
    #[must_use]
    pub fn rooms(&self) -> &Arc<RoomsFeature> {
        &self.rooms
    }

    /// Returns the scene module.
    #[must_use]
    pub fn scenes(&self) -> &Arc<ScenesFeature> {
        &self.scenes
    }

    /// Returns the feature modules in creation order.
    #[must_use]
    pub fn modules(&self) -> &[Arc<dyn FeatureModule>] {
        &self.modules
    }

    /// Returns every element owned by a module.
    #[must_use]
    pub fn elements(&self) -> Vec<Arc<UiElement>> {
        self.modules.iter().flat_map(|module| module.elements()).collect()
    }
}

impl fmt::Debug for VacuumAccessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modules: Vec<&str> = self.modules.iter().map(|module| module.name()).collect();
        f.debug_struct("VacuumAccessory")
            .field("ctx", &self.ctx)
            .field("modules", &modules)
            .field("initialized", &self.initialized.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
