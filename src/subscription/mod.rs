// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device state changes.
//!
//! Every device has one [`StateBus`]. Inbound telemetry is published on it
//! one key at a time and each feature module holds a filtered subscription
//! for the keys it cares about.
//!
//! # Overview
//!
//! - [`StateBus`] - Synchronous publish/subscribe registry
//! - [`KeyFilter`] - Selects which telemetry keys reach a subscription
//! - [`Dedup`] - Optional suppression of repeated values per key
//! - [`SubscriptionId`] - Handle used to unsubscribe
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use roborock_bridge::subscription::{Dedup, KeyFilter, StateBus};
//! use serde_json::json;
//!
//! let bus = StateBus::new();
//! let updates = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&updates);
//! bus.subscribe(KeyFilter::key("battery"), Dedup::Distinct, move |_event| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.publish("battery", json!(80));
//! bus.publish("battery", json!(80));
//! bus.publish("state", json!(8));
//!
//! assert_eq!(updates.load(Ordering::SeqCst), 1);
//! ```
//!
//! Subscriptions are not replayed: a subscriber only sees events published
//! after it subscribed and must read the device snapshot for its initial
//! state.

mod state_bus;

pub use state_bus::{Dedup, KeyFilter, StateBus, SubscriptionId};
