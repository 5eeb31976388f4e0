// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-side accessory model.
//!
//! An [`Accessory`] is the set of UI elements the bridge exposes for one
//! device. Elements are created with get-or-create semantics keyed by a
//! stable [`ElementId`], so a module asking twice for `findMe` always gets
//! the same element. Value changes are broadcast as [`ElementUpdate`]s for
//! the bridge adapter to mirror.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use roborock_bridge::accessory::{
//!     Accessory, Characteristic, ElementKind, MemoryNameStore,
//! };
//!
//! let accessory = Accessory::new("duid-1", "Vacuum", Arc::new(MemoryNameStore::new()));
//! let mut updates = accessory.subscribe();
//!
//! let find_me = accessory.get_or_create("findMe", ElementKind::Switch, "where are you");
//! let again = accessory.get_or_create("findMe", ElementKind::Switch, "where are you");
//! assert!(Arc::ptr_eq(&find_me, &again));
//!
//! find_me.update_value(Characteristic::On, false);
//! assert!(updates.try_recv().is_ok());
//! ```

mod characteristic;
mod element;
mod naming;

pub use characteristic::{Characteristic, CharacteristicValue};
pub use element::{ElementId, ElementKind, ElementUpdate, GetHandler, SetFuture, SetHandler, UiElement};
pub use naming::{MemoryNameStore, NAME_KEY_PREFIX, NameStore, configured_name_key, sanitize_name};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Default capacity of the update channel.
const DEFAULT_UPDATE_CAPACITY: usize = 256;

/// Persistent identity of an accessory.
///
/// Derived from the device id with UUID v5, so the same device maps to the
/// same accessory across restarts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessoryId(Uuid);

impl AccessoryId {
    /// Derives the identity of the accessory for a device.
    #[must_use]
    pub fn for_device(device_id: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, device_id.as_bytes()))
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = self.0.to_string();
        let short = full.get(..8).unwrap_or(&full);
        write!(f, "AccessoryId({short}...)")
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The UI elements exposed for one device.
pub struct Accessory {
    id: AccessoryId,
    device_id: String,
    display_name: String,
    elements: RwLock<BTreeMap<ElementId, Arc<UiElement>>>,
    updates: broadcast::Sender<ElementUpdate>,
    names: Arc<dyn NameStore>,
}

impl Accessory {
    /// Creates an accessory without elements.
    #[must_use]
    pub fn new(
        device_id: impl Into<String>,
        display_name: impl Into<String>,
        names: Arc<dyn NameStore>,
    ) -> Self {
        let device_id = device_id.into();
        let (updates, _) = broadcast::channel(DEFAULT_UPDATE_CAPACITY);
        Self {
            id: AccessoryId::for_device(&device_id),
            device_id,
            display_name: display_name.into(),
            elements: RwLock::new(BTreeMap::new()),
            updates,
            names,
        }
    }

    /// Returns the accessory identity.
    #[must_use]
    pub fn id(&self) -> AccessoryId {
        self.id
    }

    /// Returns the device id the accessory belongs to.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the name store.
    #[must_use]
    pub fn name_store(&self) -> &Arc<dyn NameStore> {
        &self.names
    }

    /// Subscribes to value changes of every element.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ElementUpdate> {
        self.updates.subscribe()
    }

    /// Returns the element with `id`, creating it if needed.
    ///
    /// A newly created element, or one restored from the host without a
    /// name binding yet, gets its configured name set up from the name
    /// store.
    pub fn get_or_create(
        &self,
        id: impl Into<ElementId>,
        kind: ElementKind,
        name: &str,
    ) -> Arc<UiElement> {
        let id = id.into();
        let element = {
            let mut elements = self.elements.write();
            if let Some(existing) = elements.get(&id) {
                Arc::clone(existing)
            } else {
                tracing::debug!(element = %id, ?kind, name, "Creating element");
                let element = Arc::new(UiElement::new(
                    id.clone(),
                    kind,
                    name,
                    self.updates.clone(),
                ));
                elements.insert(id, Arc::clone(&element));
                element
            }
        };
        if !element.has_set_handler(Characteristic::ConfiguredName) {
            naming::ensure_name(&element, &self.names, name);
        }
        element
    }

    /// Adds an element the host persisted from a previous run.
    ///
    /// Restored elements carry no handlers until a module claims them via
    /// [`Accessory::get_or_create`].
    pub fn restore(&self, id: impl Into<ElementId>, kind: ElementKind, name: &str) {
        let id = id.into();
        let mut elements = self.elements.write();
        if !elements.contains_key(&id) {
            let element = UiElement::new(id.clone(), kind, name, self.updates.clone());
            elements.insert(id, Arc::new(element));
        }
    }

    /// Looks up an element.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<Arc<UiElement>> {
        self.elements.read().get(id).cloned()
    }

    /// Removes an element.
    ///
    /// The removed element is detached: further host interaction with it
    /// fails with `Error::StaleReference`.
    pub fn remove(&self, id: &str) -> Option<Arc<UiElement>> {
        let removed = self.elements.write().remove(id);
        if let Some(element) = &removed {
            element.detach();
            tracing::debug!(element = %element.id(), "Removed element");
        }
        removed
    }

    /// Returns all elements in identifier order.
    #[must_use]
    pub fn elements(&self) -> Vec<Arc<UiElement>> {
        self.elements.read().values().cloned().collect()
    }

    /// Returns the identifiers starting with `prefix`.
    #[must_use]
    pub fn element_ids_with_prefix(&self, prefix: &str) -> Vec<ElementId> {
        self.elements
            .read()
            .keys()
            .filter(|id| id.as_str().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    /// Returns `true` if the accessory has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    /// Answers a host read on an element.
    ///
    /// # Errors
    ///
    /// Returns `Error::StaleReference` for unknown elements, otherwise
    /// whatever [`UiElement::handle_get`] returns.
    pub fn handle_get(&self, id: &str, characteristic: Characteristic) -> Result<CharacteristicValue> {
        self.require(id)?.handle_get(characteristic)
    }

    /// Applies a host write to an element.
    ///
    /// # Errors
    ///
    /// Returns `Error::StaleReference` for unknown elements, otherwise
    /// whatever [`UiElement::handle_set`] returns.
    pub async fn handle_set(
        &self,
        id: &str,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) -> Result<()> {
        let element = self.require(id)?;
        element.handle_set(characteristic, value.into()).await
    }

    fn require(&self, id: &str) -> Result<Arc<UiElement>> {
        self.element(id).ok_or_else(|| Error::StaleReference { id: id.to_string() })
    }
}

impl fmt::Debug for Accessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessory")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("elements", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accessory() -> (Accessory, Arc<MemoryNameStore>) {
        let store = Arc::new(MemoryNameStore::new());
        let names: Arc<dyn NameStore> = store.clone();
        (Accessory::new("duid-1", "Vacuum", names), store)
    }

    #[test]
    fn accessory_id_is_stable() {
        assert_eq!(AccessoryId::for_device("abc"), AccessoryId::for_device("abc"));
        assert_ne!(AccessoryId::for_device("abc"), AccessoryId::for_device("abd"));
        assert_eq!(AccessoryId::for_device("abc").as_uuid().get_version_num(), 5);
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let (accessory, _) = accessory();
        let a = accessory.get_or_create("room-16", ElementKind::Switch, "cleaning Kitchen");
        let b = accessory.get_or_create("room-16", ElementKind::Switch, "cleaning Kitchen");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(accessory.len(), 1);
    }

    #[test]
    fn configured_name_defaults_to_name() {
        let (accessory, _) = accessory();
        let element = accessory.get_or_create("dock", ElementKind::OccupancySensor, "Vacuum Dock");
        assert_eq!(
            element.value(Characteristic::ConfiguredName),
            Some(CharacteristicValue::from("Vacuum Dock"))
        );
    }

    #[tokio::test]
    async fn configured_name_persists() {
        let (accessory, store) = accessory();
        accessory.get_or_create("pause", ElementKind::Switch, "Vacuum Pause");
        accessory
            .handle_set("pause", Characteristic::ConfiguredName, "Hold on")
            .await
            .unwrap();
        assert_eq!(
            store.load("configured-name-Vacuum_Pause").as_deref(),
            Some("Hold on")
        );

        let names: Arc<dyn NameStore> = store.clone();
        let restarted = Accessory::new("duid-1", "Vacuum", names);
        let element = restarted.get_or_create("pause", ElementKind::Switch, "Vacuum Pause");
        assert_eq!(
            element.value(Characteristic::ConfiguredName),
            Some(CharacteristicValue::from("Hold on"))
        );
    }

    #[tokio::test]
    async fn removed_elements_are_stale() {
        let (accessory, _) = accessory();
        let element = accessory.get_or_create("scene-7", ElementKind::Switch, "Morning");
        element.on_set(Characteristic::On, |_| async { Ok(()) });

        assert!(accessory.remove("scene-7").is_some());
        assert!(element.is_detached());

        let err = accessory
            .handle_set("scene-7", Characteristic::On, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StaleReference { .. }));
        let err = element
            .handle_set(Characteristic::On, true.into())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StaleReference { .. }));
    }

    #[test]
    fn restored_elements_are_claimed() {
        let (accessory, _) = accessory();
        accessory.restore("scene-3", ElementKind::Switch, "Old");
        accessory.restore("room-1", ElementKind::Switch, "Hall");

        assert_eq!(
            accessory.element_ids_with_prefix("scene-"),
            vec![ElementId::from("scene-3")]
        );

        let claimed = accessory.get_or_create("scene-3", ElementKind::Switch, "Old");
        assert!(claimed.has_set_handler(Characteristic::ConfiguredName));
        assert_eq!(accessory.len(), 2);
    }
}
