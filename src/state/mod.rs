// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state-change events.
//!
//! A [`StateChangeEvent`] is one telemetry field changing to a new value.
//! Events carry no identity beyond their content; the [`keys`] module names
//! the telemetry fields the feature modules react to.
//!
//! # Examples
//!
//! ```
//! use roborock_bridge::state::{StateChangeEvent, keys};
//! use serde_json::json;
//!
//! let event = StateChangeEvent::new(keys::BATTERY, json!(80));
//! assert_eq!(event.key(), "battery");
//! assert_eq!(event.as_i64(), Some(80));
//! ```

pub mod keys;
mod state_change;

pub use state_change::StateChangeEvent;
