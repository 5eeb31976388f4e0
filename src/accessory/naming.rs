// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display names and their persistence.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::characteristic::{Characteristic, CharacteristicValue};
use super::element::UiElement;

/// Prefix of the storage keys used for configured names.
pub const NAME_KEY_PREFIX: &str = "configured-name";

/// Key/value storage for names the user gave to elements.
///
/// Implementations must be cheap to call from synchronous code; the
/// bridge host typically backs this with its own persistent storage.
pub trait NameStore: Send + Sync {
    /// Loads a stored name.
    fn load(&self, key: &str) -> Option<String>;

    /// Stores a name.
    fn store(&self, key: &str, name: &str);
}

/// In-memory [`NameStore`].
#[derive(Debug, Default)]
pub struct MemoryNameStore {
    names: RwLock<HashMap<String, String>>,
}

impl MemoryNameStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

impl NameStore for MemoryNameStore {
    fn load(&self, key: &str) -> Option<String> {
        self.names.read().get(key).cloned()
    }

    fn store(&self, key: &str, name: &str) {
        self.names.write().insert(key.to_string(), name.to_string());
    }
}

/// Returns the storage key for an element created with `name`.
///
/// Every run of whitespace becomes a single `_`.
///
/// # Examples
///
/// ```
/// use roborock_bridge::accessory::configured_name_key;
///
/// assert_eq!(
///     configured_name_key("cleaning  Living Room"),
///     "configured-name-cleaning_Living_Room"
/// );
/// ```
#[must_use]
pub fn configured_name_key(name: &str) -> String {
    let mut key = String::with_capacity(NAME_KEY_PREFIX.len() + 1 + name.len());
    key.push_str(NAME_KEY_PREFIX);
    key.push('-');
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                key.push('_');
            }
            in_whitespace = true;
        } else {
            key.push(c);
            in_whitespace = false;
        }
    }
    key
}

/// Makes an externally supplied name safe for display.
///
/// Letters, digits and spaces are kept; anything else becomes `_`.
///
/// ```
/// use roborock_bridge::accessory::sanitize_name;
///
/// assert_eq!(sanitize_name("Kids' room #2"), "Kids_ room _2");
/// ```
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == ' ' { c } else { '_' })
        .collect()
}

/// Sets up the configured name of an element.
///
/// A stored name wins over `name`. When nothing is stored yet, `name` is
/// used as the initial configured name. Later host writes are persisted.
pub(crate) fn ensure_name(element: &Arc<UiElement>, store: &Arc<dyn NameStore>, name: &str) {
    let key = configured_name_key(name);
    let current = store.load(&key).unwrap_or_else(|| name.to_string());
    element.update_value(Characteristic::ConfiguredName, current);

    let store = Arc::clone(store);
    let weak: Weak<UiElement> = Arc::downgrade(element);
    element.on_set(Characteristic::ConfiguredName, move |value: CharacteristicValue| {
        let store = Arc::clone(&store);
        let key = key.clone();
        let weak = weak.clone();
        async move {
            if let Some(name) = value.as_str() {
                store.store(&key, name);
                if let Some(element) = weak.upgrade() {
                    tracing::debug!(element = %element.id(), name, "Configured name changed");
                }
            }
            Ok(())
        }
    });
}
