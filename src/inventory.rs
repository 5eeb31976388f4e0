// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keeps a dynamic set of elements in line with a device-side list.
//!
//! Rooms and scenes come and go as the user edits them in the vendor app.
//! Each entry gets one element whose id is a fixed prefix plus the entry
//! id (`room-16`, `scene-7`); display names play no part in identity.
//! Reconciling against a fresh list keeps elements for ids that are still
//! there, creates elements for new ids and removes the rest, including
//! elements the host restored from an earlier run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::accessory::{Accessory, ElementId, ElementKind, UiElement};
use crate::device::{Room, Scene};

/// An entry of a device-side list.
pub trait InventoryItem: Send + Sync {
    /// Stable identity of the entry.
    type Id: Copy + Ord + fmt::Display + Send + Sync + 'static;

    /// Returns the entry id.
    fn id(&self) -> Self::Id;

    /// Returns the display name.
    fn name(&self) -> &str;

    /// Returns `false` for entries that should have no element.
    fn is_visible(&self) -> bool {
        true
    }
}

impl InventoryItem for Scene {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_visible(&self) -> bool {
        self.enabled
    }
}

impl InventoryItem for Room {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Element changes made by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Elements created for new ids.
    pub added: Vec<ElementId>,
    /// Elements removed because their id disappeared.
    pub removed: Vec<ElementId>,
}

impl ReconcileOutcome {
    /// Returns `true` if nothing was added or removed.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

type NameFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type BindFn<T> = Box<dyn Fn(&T, &Arc<UiElement>) + Send + Sync>;

/// Reconciles one element per visible inventory entry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use roborock_bridge::accessory::{Accessory, ElementKind, MemoryNameStore};
/// use roborock_bridge::device::Room;
/// use roborock_bridge::inventory::InventoryReconciler;
///
/// let accessory = Arc::new(Accessory::new("duid", "Robbie", Arc::new(MemoryNameStore::new())));
/// let rooms = InventoryReconciler::new(
///     Arc::clone(&accessory),
///     "room-",
///     ElementKind::Switch,
///     |room: &Room| format!("cleaning {}", room.name),
///     |_room, _element| {},
/// );
///
/// let outcome = rooms.reconcile(&[Room::new(16, "Kitchen"), Room::new(17, "Hall")]);
/// assert_eq!(outcome.added.len(), 2);
/// assert!(accessory.element("room-16").is_some());
///
/// let outcome = rooms.reconcile(&[Room::new(17, "Hall")]);
/// assert_eq!(outcome.removed[0].as_str(), "room-16");
/// ```
pub struct InventoryReconciler<T: InventoryItem> {
    accessory: Arc<Accessory>,
    prefix: &'static str,
    kind: ElementKind,
    name_for: NameFn<T>,
    bind: BindFn<T>,
    recorded: Mutex<Option<BTreeMap<T::Id, Arc<UiElement>>>>,
}

impl<T: InventoryItem> InventoryReconciler<T> {
    /// Creates a reconciler.
    ///
    /// `name_for` builds the element name of an entry; `bind` installs the
    /// element's handlers and runs once per created element.
    pub fn new<N, B>(
        accessory: Arc<Accessory>,
        prefix: &'static str,
        kind: ElementKind,
        name_for: N,
        bind: B,
    ) -> Self
    where
        N: Fn(&T) -> String + Send + Sync + 'static,
        B: Fn(&T, &Arc<UiElement>) + Send + Sync + 'static,
    {
        Self {
            accessory,
            prefix,
            kind,
            name_for: Box::new(name_for),
            bind: Box::new(bind),
            recorded: Mutex::new(None),
        }
    }

    /// Returns the element id used for an entry id.
    #[must_use]
    pub fn element_id(&self, id: T::Id) -> ElementId {
        ElementId::new(format!("{}{id}", self.prefix))
    }

    /// Returns the element of an entry, if it is currently exposed.
    #[must_use]
    pub fn element(&self, id: T::Id) -> Option<Arc<UiElement>> {
        self.recorded
            .lock()
            .as_ref()
            .and_then(|recorded| recorded.get(&id).cloned())
    }

    /// Returns the exposed elements in id order.
    #[must_use]
    pub fn elements(&self) -> Vec<Arc<UiElement>> {
        self.recorded
            .lock()
            .as_ref()
            .map(|recorded| recorded.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the exposed entry ids.
    #[must_use]
    pub fn ids(&self) -> Vec<T::Id> {
        self.recorded
            .lock()
            .as_ref()
            .map(|recorded| recorded.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Brings the elements in line with `items`.
    ///
    /// Does nothing when the visible ids equal those of the previous call.
    /// The first call always runs, so stale elements restored by the host
    /// are cleaned up even when the list is empty.
    pub fn reconcile(&self, items: &[T]) -> ReconcileOutcome {
        let visible: BTreeMap<T::Id, &T> = items
            .iter()
            .filter(|item| item.is_visible())
            .map(|item| (item.id(), item))
            .collect();

        let mut recorded = self.recorded.lock();
        let previous = recorded.take();
        let unchanged = previous
            .as_ref()
            .is_some_and(|prev| prev.keys().eq(visible.keys()));
        if unchanged {
            *recorded = previous;
            return ReconcileOutcome::default();
        }

        let mut kept = previous.unwrap_or_default();
        let mut outcome = ReconcileOutcome::default();

        for (id, item) in &visible {
            if kept.contains_key(id) {
                continue;
            }
            let element_id = self.element_id(*id);
            let element = self
                .accessory
                .get_or_create(element_id.clone(), self.kind, &(self.name_for)(item));
            (self.bind)(item, &element);
            kept.insert(*id, element);
            outcome.added.push(element_id);
        }

        kept.retain(|id, _| visible.contains_key(id));
        let wanted: BTreeSet<ElementId> = kept.keys().map(|id| self.element_id(*id)).collect();
        for stale in self.accessory.element_ids_with_prefix(self.prefix) {
            if !wanted.contains(&stale) {
                self.accessory.remove(stale.as_str());
                outcome.removed.push(stale);
            }
        }

        *recorded = Some(kept);
        drop(recorded);

        if !outcome.is_unchanged() {
            tracing::debug!(
                prefix = self.prefix,
                added = outcome.added.len(),
                removed = outcome.removed.len(),
                "Inventory reconciled"
            );
        }
        outcome
    }
}

impl<T: InventoryItem> fmt::Debug for InventoryReconciler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryReconciler")
            .field("prefix", &self.prefix)
            .field("kind", &self.kind)
            .field("elements", &self.ids().len())
            .finish_non_exhaustive()
    }
}
