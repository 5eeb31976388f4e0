// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UI elements and their characteristic handlers.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::characteristic::{Characteristic, CharacteristicValue};
use crate::error::{Error, Result};

/// Future returned by a write handler.
pub type SetFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Write handler for one characteristic.
pub type SetHandler = Arc<dyn Fn(CharacteristicValue) -> SetFuture + Send + Sync>;

/// Read handler for one characteristic.
pub type GetHandler = Arc<dyn Fn() -> CharacteristicValue + Send + Sync>;

/// Stable identifier of a UI element within its accessory.
///
/// Examples are `findMe`, `room-16` or `scene-7`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(String);

impl ElementId {
    /// Creates an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Type of a UI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Manufacturer, model and firmware details.
    AccessoryInformation,
    /// On/off switch.
    Switch,
    /// Fan with rotation speed.
    Fan,
    /// Lightbulb-style level control.
    Lightbulb,
    /// Occupancy sensor.
    OccupancySensor,
    /// Contact sensor.
    ContactSensor,
    /// Battery service.
    Battery,
}

/// A change of a characteristic value, as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementUpdate {
    /// Element that changed.
    pub element: ElementId,
    /// Characteristic that changed.
    pub characteristic: Characteristic,
    /// New value.
    pub value: CharacteristicValue,
}

/// A typed UI element of an accessory.
///
/// Values pushed by feature modules go through [`UiElement::update_value`],
/// which records the value and notifies the host. Host interaction goes
/// through [`UiElement::handle_get`] and [`UiElement::handle_set`].
pub struct UiElement {
    id: ElementId,
    kind: ElementKind,
    name: String,
    values: RwLock<BTreeMap<Characteristic, CharacteristicValue>>,
    set_handlers: RwLock<HashMap<Characteristic, SetHandler>>,
    get_handlers: RwLock<HashMap<Characteristic, GetHandler>>,
    updates: broadcast::Sender<ElementUpdate>,
    detached: AtomicBool,
}

impl UiElement {
    pub(crate) fn new(
        id: ElementId,
        kind: ElementKind,
        name: impl Into<String>,
        updates: broadcast::Sender<ElementUpdate>,
    ) -> Self {
        let name = name.into();
        let mut values = BTreeMap::new();
        values.insert(Characteristic::Name, CharacteristicValue::Text(name.clone()));
        Self {
            id,
            kind,
            name,
            values: RwLock::new(values),
            set_handlers: RwLock::new(HashMap::new()),
            get_handlers: RwLock::new(HashMap::new()),
            updates,
            detached: AtomicBool::new(false),
        }
    }

    /// Returns the element identifier.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Returns the element type.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the name the element was created with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the last recorded value of a characteristic.
    #[must_use]
    pub fn value(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        self.values.read().get(&characteristic).cloned()
    }

    /// Returns the recorded value as a boolean, `false` when unset.
    #[must_use]
    pub fn bool_value(&self, characteristic: Characteristic) -> bool {
        self.value(characteristic)
            .and_then(|v| v.as_bool().ok())
            .unwrap_or(false)
    }

    /// Returns the recorded value as an integer.
    #[must_use]
    pub fn int_value(&self, characteristic: Characteristic) -> Option<i64> {
        self.value(characteristic).and_then(|v| v.as_i64())
    }

    /// Records a value and notifies the host.
    pub fn update_value(&self, characteristic: Characteristic, value: impl Into<CharacteristicValue>) {
        let value = value.into();
        self.values.write().insert(characteristic, value.clone());
        // No receivers is fine; the host may not be listening yet.
        let _ = self.updates.send(ElementUpdate {
            element: self.id.clone(),
            characteristic,
            value,
        });
    }

    /// Registers the write handler for a characteristic, replacing any
    /// previous one.
    pub fn on_set<F, Fut>(&self, characteristic: Characteristic, handler: F)
    where
        F: Fn(CharacteristicValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let handler: SetHandler = Arc::new(move |value| Box::pin(handler(value)));
        self.set_handlers.write().insert(characteristic, handler);
    }

    /// Registers the read handler for a characteristic, replacing any
    /// previous one.
    pub fn on_get<F>(&self, characteristic: Characteristic, handler: F)
    where
        F: Fn() -> CharacteristicValue + Send + Sync + 'static,
    {
        self.get_handlers
            .write()
            .insert(characteristic, Arc::new(handler));
    }

    /// Returns `true` if a write handler is registered.
    #[must_use]
    pub fn has_set_handler(&self, characteristic: Characteristic) -> bool {
        self.set_handlers.read().contains_key(&characteristic)
    }

    /// Answers a host read.
    ///
    /// Uses the read handler when one is registered and falls back to the
    /// recorded value otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Error::StaleReference` if the element was removed and
    /// `Error::UnsupportedCharacteristic` if the characteristic has neither
    /// handler nor value.
    pub fn handle_get(&self, characteristic: Characteristic) -> Result<CharacteristicValue> {
        self.ensure_attached()?;
        let handler = self.get_handlers.read().get(&characteristic).cloned();
        if let Some(handler) = handler {
            return Ok(handler());
        }
        self.value(characteristic)
            .ok_or(Error::UnsupportedCharacteristic(characteristic))
    }

    /// Applies a host write.
    ///
    /// The new value is echoed before the handler runs. If the handler fails,
    /// the previous value is restored and the error is returned to the host.
    ///
    /// # Errors
    ///
    /// Returns `Error::StaleReference` if the element was removed,
    /// `Error::UnsupportedCharacteristic` if nothing handles the write, or
    /// the handler's error.
    pub async fn handle_set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<()> {
        self.ensure_attached()?;
        let handler = self
            .set_handlers
            .read()
            .get(&characteristic)
            .cloned()
            .ok_or(Error::UnsupportedCharacteristic(characteristic))?;

        let previous = self.value(characteristic);
        self.update_value(characteristic, value.clone());

        match handler(value).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::error!(
                    element = %self.id,
                    characteristic = %characteristic,
                    error = %err,
                    "Write failed, reverting"
                );
                if let Some(previous) = previous {
                    self.update_value(characteristic, previous);
                }
                Err(err)
            }
        }
    }

    /// Returns `true` once the element has been removed from its accessory.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    fn ensure_attached(&self) -> Result<()> {
        if self.is_detached() {
            return Err(Error::StaleReference {
                id: self.id.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiElement")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}
