// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature modules.
//!
//! Each module owns the UI elements of one capability of the robot. At
//! construction it decides, from the configuration and the probed
//! [`Capabilities`], whether it exposes anything at all. An absent
//! capability gives a module without elements that does nothing.
//!
//! [`FeatureModule::init`] subscribes the module to the slice of the
//! [`StateBus`](crate::subscription::StateBus) it cares about and pushes the
//! current value of every owned element once, so the host starts from the
//! device snapshot instead of waiting for the next telemetry message.
//!
//! Host writes follow the same path everywhere: the element echoes the new
//! value, the module translates it into a [`DeviceCommand`] and sends it. A
//! failing command restores the previous value and the error goes back to
//! the host.
//!
//! Handlers and subscriptions hold weak references to their module, so
//! dropping the composer releases everything.

mod actions;
mod battery;
mod cleaning;
mod dock;
mod error_sensor;
mod find_me;
mod levels;
mod pause;
mod product_info;
mod rooms;
mod scenes;
mod toggles;
mod volume;
mod water_box;
mod zones;

pub use actions::ActionsFeature;
pub use battery::{BatteryFeature, LOW_BATTERY_THRESHOLD};
pub use cleaning::CleaningFeature;
pub use dock::DockFeature;
pub use error_sensor::ErrorSensorFeature;
pub use find_me::FindMeFeature;
pub use levels::{Level, LevelsFeature};
pub use pause::PauseFeature;
pub use product_info::{MANUFACTURER, ProductInfoFeature, UNKNOWN};
pub use rooms::RoomsFeature;
pub use scenes::ScenesFeature;
pub use toggles::{Toggle, TogglesFeature};
pub use volume::{DEFAULT_VOLUME, VolumeFeature};
pub use water_box::WaterBoxFeature;
pub use zones::ZonesFeature;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::accessory::{Accessory, Characteristic, CharacteristicValue, ElementKind, UiElement};
use crate::capabilities::{Capabilities, Feature};
use crate::command::DeviceCommand;
use crate::config::Config;
use crate::device::VacuumDevice;
use crate::error::Result;
use crate::momentary::MomentaryAction;
use crate::state::StateChangeEvent;
use crate::subscription::{Dedup, KeyFilter, SubscriptionId};

/// One capability of the robot exposed as UI elements.
pub trait FeatureModule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Subscribes to telemetry and pushes the current values.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot start. Other modules are not
    /// affected.
    fn init(self: Arc<Self>) -> Result<()>;

    /// Returns the elements owned by the module.
    fn elements(&self) -> Vec<Arc<UiElement>>;
}

/// Everything a feature module needs: configuration, device and host
/// surface.
pub struct CoreContext {
    config: Config,
    device: VacuumDevice,
    accessory: Arc<Accessory>,
    capabilities: Capabilities,
}

impl CoreContext {
    /// Creates a context.
    #[must_use]
    pub fn new(
        config: Config,
        device: VacuumDevice,
        accessory: Arc<Accessory>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            config,
            device,
            accessory,
            capabilities,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the device.
    #[must_use]
    pub fn device(&self) -> &VacuumDevice {
        &self.device
    }

    /// Returns the host accessory.
    #[must_use]
    pub fn accessory(&self) -> &Arc<Accessory> {
        &self.accessory
    }

    /// Returns the probed capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns `true` if the robot supports `feature`.
    #[must_use]
    pub fn supports(&self, feature: Feature) -> bool {
        self.capabilities.supports(feature)
    }

    /// Gets or creates an element on the accessory.
    pub fn element(&self, id: &str, kind: ElementKind, name: &str) -> Arc<UiElement> {
        self.accessory.get_or_create(id, kind, name)
    }

    /// Turns `element` into a momentary switch sending `command`.
    pub fn bind_momentary(
        self: &Arc<Self>,
        element: &Arc<UiElement>,
        command: DeviceCommand,
    ) -> Arc<MomentaryAction> {
        let ctx = Arc::downgrade(self);
        MomentaryAction::bind(element, self.config.momentary_reset(), move || {
            let ctx = ctx.upgrade();
            let command = command.clone();
            async move {
                match ctx {
                    Some(ctx) => ctx.device.send(command).await,
                    None => Ok(()),
                }
            }
        })
    }

    /// Starts cleaning: the given rooms when there are any, everything
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the device rejects the command.
    pub async fn start_cleaning(&self, rooms: Vec<u32>) -> Result<()> {
        if rooms.is_empty() {
            self.device.send(DeviceCommand::Start).await?;
            tracing::info!(device = %self.device.device_id(), "Started full cleaning");
        } else {
            tracing::info!(device = %self.device.device_id(), ?rooms, "Starting room cleaning");
            self.device.send(DeviceCommand::SegmentClean(rooms)).await?;
        }
        Ok(())
    }
}

impl fmt::Debug for CoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreContext")
            .field("device", &self.device)
            .field("accessory", &self.accessory)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Binding helpers
// ============================================================================

/// Registers a write handler that runs while `module` is alive.
pub(crate) fn bind_set<M, F, Fut>(
    element: &UiElement,
    characteristic: Characteristic,
    module: &Arc<M>,
    handler: F,
) where
    M: Send + Sync + 'static,
    F: Fn(Arc<M>, CharacteristicValue) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let module = Arc::downgrade(module);
    let handler = Arc::new(handler);
    element.on_set(characteristic, move |value| {
        let module = module.upgrade();
        let handler = Arc::clone(&handler);
        async move {
            match module {
                Some(module) => handler(module, value).await,
                None => Ok(()),
            }
        }
    });
}

/// Registers a read handler that answers from `module` while it is alive.
pub(crate) fn bind_get<M, F, V>(
    element: &UiElement,
    characteristic: Characteristic,
    module: &Arc<M>,
    read: F,
) where
    M: Send + Sync + 'static,
    F: Fn(&M) -> V + Send + Sync + 'static,
    V: Into<CharacteristicValue>,
{
    let module = Arc::downgrade(module);
    element.on_get(characteristic, move || {
        module
            .upgrade()
            .map_or(CharacteristicValue::Bool(false), |module| read(&module).into())
    });
}

/// Subscribes `module` to the device bus.
pub(crate) fn subscribe<M, F>(
    ctx: &CoreContext,
    module: &Arc<M>,
    filter: KeyFilter,
    dedup: Dedup,
    callback: F,
) -> SubscriptionId
where
    M: Send + Sync + 'static,
    F: Fn(&M, &StateChangeEvent) + Send + Sync + 'static,
{
    let module = Arc::downgrade(module);
    ctx.device().bus().subscribe(filter, dedup, move |event| {
        if let Some(module) = module.upgrade() {
            callback(&module, event);
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared setup for module tests.

    use std::sync::Arc;

    use super::CoreContext;
    use crate::accessory::{Accessory, MemoryNameStore};
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::device::fake::FakeDevice;
    use crate::device::{DeviceControl, VacuumDevice};

    pub(crate) fn context(
        config: Config,
        capabilities: Capabilities,
    ) -> (Arc<CoreContext>, Arc<FakeDevice>) {
        let fake = Arc::new(FakeDevice::new());
        let device = VacuumDevice::new(Arc::clone(&fake) as Arc<dyn DeviceControl>);
        let accessory = Arc::new(Accessory::new(
            "fake-duid",
            config.name.clone(),
            Arc::new(MemoryNameStore::new()),
        ));
        (
            Arc::new(CoreContext::new(config, device, accessory, capabilities)),
            fake,
        )
    }
}
