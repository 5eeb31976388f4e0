// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device publish/subscribe channel for telemetry changes.

use std::collections::{BTreeMap, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::state::StateChangeEvent;

/// Unique identifier for a subscription.
///
/// IDs are unique within a bus's lifetime and increase with subscription
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Selects the telemetry keys delivered to a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// Every key.
    Any,
    /// A single key.
    Key(String),
    /// Any key of the set.
    Keys(Vec<String>),
}

impl KeyFilter {
    /// Filter for a single key.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Filter for a set of keys.
    #[must_use]
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if events for `key` pass the filter.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Key(k) => k == key,
            Self::Keys(keys) => keys.iter().any(|k| k == key),
        }
    }
}

/// Whether a subscription suppresses repeated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dedup {
    /// Deliver every matching event (level-style subscribers).
    #[default]
    None,
    /// Skip an event whose value equals the last value delivered to this
    /// subscription for the same key (transition-style subscribers).
    Distinct,
}

type EventCallback = Arc<dyn Fn(&StateChangeEvent) + Send + Sync>;

struct Subscription {
    filter: KeyFilter,
    dedup: Dedup,
    last_delivered: Mutex<HashMap<String, Value>>,
    callback: EventCallback,
}

impl Subscription {
    /// Returns `true` if the event should reach the callback, recording it
    /// as delivered when deduplicating.
    fn admit(&self, event: &StateChangeEvent) -> bool {
        if !self.filter.matches(event.key()) {
            return false;
        }
        if self.dedup == Dedup::None {
            return true;
        }
        let mut last = self.last_delivered.lock();
        if last.get(event.key()) == Some(event.value()) {
            return false;
        }
        last.insert(event.key().to_string(), event.value().clone());
        true
    }
}

/// Synchronous publish/subscribe registry for one device.
///
/// Delivery happens on the publishing task, in subscription order. The
/// registry lock is released before callbacks run, so a callback may itself
/// subscribe or publish. A panicking callback is logged and does not stop
/// delivery to the remaining subscribers.
pub struct StateBus {
    next_id: AtomicU64,
    subscriptions: RwLock<BTreeMap<SubscriptionId, Arc<Subscription>>>,
}

impl StateBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers a callback for events passing `filter`.
    pub fn subscribe<F>(&self, filter: KeyFilter, dedup: Dedup, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChangeEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let subscription = Subscription {
            filter,
            dedup,
            last_delivered: Mutex::new(HashMap::new()),
            callback: Arc::new(callback),
        };
        self.subscriptions.write().insert(id, Arc::new(subscription));
        id
    }

    /// Removes a subscription.
    ///
    /// Returns `true` if it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.write().remove(&id).is_some()
    }

    /// Returns the number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Publishes a single key/value change.
    pub fn publish(&self, key: impl Into<String>, value: Value) {
        self.publish_event(&StateChangeEvent::new(key, value));
    }

    /// Publishes an event to every matching subscription.
    ///
    /// Returns the number of callbacks that were invoked.
    pub fn publish_event(&self, event: &StateChangeEvent) -> usize {
        let targets: Vec<(SubscriptionId, Arc<Subscription>)> = self
            .subscriptions
            .read()
            .iter()
            .map(|(id, sub)| (*id, Arc::clone(sub)))
            .collect();

        let mut delivered = 0;
        for (id, subscription) in targets {
            if !subscription.admit(event) {
                continue;
            }
            delivered += 1;
            let callback = &subscription.callback;
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                tracing::error!(
                    subscription = %id,
                    key = %event.key(),
                    "State subscriber panicked, continuing delivery"
                );
            }
        }

        tracing::trace!(key = %event.key(), delivered, "Published state change");
        delivered
    }
}

impl Default for StateBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
