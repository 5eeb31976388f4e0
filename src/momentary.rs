// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push-button behavior on top of an on/off switch.
//!
//! Fire-and-forget commands (find me, return to dock, scenes, ...) are
//! exposed as switches the user turns on. The command runs once, and the
//! switch falls back to off after a short delay whether the command
//! succeeded or not. Reads always answer `false`.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::accessory::{Characteristic, CharacteristicValue, UiElement};
use crate::error::Result;

/// Default delay before a triggered switch turns itself off.
pub const DEFAULT_RESET: Duration = Duration::from_secs(1);

/// A momentary switch bound to one element's `On` characteristic.
///
/// Turning the switch off is ignored. Turning it on runs the action and
/// schedules a single revert to off; a new trigger before the revert fires
/// cancels it and schedules a fresh one.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use roborock_bridge::accessory::{Accessory, ElementKind, MemoryNameStore};
/// use roborock_bridge::momentary::{MomentaryAction, DEFAULT_RESET};
///
/// let accessory = Accessory::new("duid", "Robbie", Arc::new(MemoryNameStore::new()));
/// let element = accessory.get_or_create("findMe", ElementKind::Switch, "Robbie where are you");
/// let _find_me = MomentaryAction::bind(&element, DEFAULT_RESET, || async {
///     // send the find-me command here
///     Ok(())
/// });
/// ```
pub struct MomentaryAction {
    element: Weak<UiElement>,
    reset: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl MomentaryAction {
    /// Turns `element` into a momentary switch running `action` on each
    /// trigger.
    ///
    /// The element's `On` value is set to `false` and its read handler
    /// answers `false` from now on.
    pub fn bind<F, Fut>(element: &Arc<UiElement>, reset: Duration, action: F) -> Arc<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let momentary = Arc::new(Self {
            element: Arc::downgrade(element),
            reset,
            pending: Mutex::new(None),
        });

        element.update_value(Characteristic::On, false);
        element.on_get(Characteristic::On, || CharacteristicValue::Bool(false));

        let action = Arc::new(action);
        let handle = Arc::clone(&momentary);
        element.on_set(Characteristic::On, move |value| {
            let momentary = Arc::clone(&handle);
            let action = Arc::clone(&action);
            async move { momentary.trigger(&value, || action()).await }
        });

        momentary
    }

    /// Runs `action` for an on write and schedules the revert.
    ///
    /// # Errors
    ///
    /// Returns the action's error, or `Error::Value` if `value` is not a
    /// boolean-like value. The revert is scheduled in both cases where the
    /// action ran.
    pub async fn trigger<F, Fut>(&self, value: &CharacteristicValue, action: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if !value.as_bool()? {
            return Ok(());
        }
        let result = action().await;
        self.schedule_reset();
        result
    }

    /// Returns the revert delay.
    #[must_use]
    pub fn reset_delay(&self) -> Duration {
        self.reset
    }

    /// Returns `true` while a revert is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Cancels a scheduled revert.
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    fn schedule_reset(&self) {
        let element = self.element.clone();
        let delay = self.reset;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(element) = element.upgrade() {
                element.update_value(Characteristic::On, false);
            }
        });
        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }
}

impl Drop for MomentaryAction {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for MomentaryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MomentaryAction")
            .field("reset", &self.reset)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}
