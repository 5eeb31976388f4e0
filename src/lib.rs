// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roborock Bridge - exposes Roborock robot vacuums as smart-home
//! accessories.
//!
//! The crate sits between a vendor transport (cloud or local protocol,
//! supplied by the caller through [`DeviceControl`]) and a home-automation
//! host that shows typed UI elements: switches, fans, lights, sensors.
//!
//! # Supported Features
//!
//! - **Cleaning**: start/stop, pause/resume, suction power, water flow
//! - **Rooms and zones**: per-room selection with auto start, configured zones
//! - **Scenes**: one momentary switch per enabled vendor scene
//! - **Dock**: docked sensor, dust collection, mop wash, dryer
//! - **Settings**: LEDs, child lock, do-not-disturb, carpet handling, volume
//! - **Status**: battery, error sensor, product information
//!
//! # Architecture
//!
//! Inbound telemetry is split into key/value pairs
//! ([`telemetry::TelemetryUpdate`]) and published on the device's
//! [`StateBus`]. Each feature module subscribes to the keys it cares about
//! and updates its elements, mapping device modes to percentages through
//! the [`quantize`] tables. Host writes travel the other way: the module
//! quantizes the value, sends a [`DeviceCommand`] and reverts the element
//! if the robot rejects it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use roborock_bridge::accessory::{Accessory, Characteristic, MemoryNameStore};
//! use roborock_bridge::{Config, DeviceControl, VacuumAccessory};
//! use serde_json::json;
//!
//! # async fn run(control: Arc<dyn DeviceControl>) -> roborock_bridge::Result<()> {
//! let config = Config::default().with_name("Robbie").with_pause(true);
//! let accessory = Arc::new(Accessory::new(
//!     control.device_id(),
//!     config.name.clone(),
//!     Arc::new(MemoryNameStore::new()),
//! ));
//!
//! let vacuum = VacuumAccessory::new(config, control, accessory)?;
//! vacuum.start().await?;
//!
//! // Transport pushes go to the composer.
//! vacuum.notify_device_update("LocalMessage", &json!([{ "state": 5, "battery": 80 }]));
//!
//! // Host writes go to the accessory.
//! vacuum
//!     .accessory()
//!     .handle_set("main", Characteristic::RotationSpeed, 75)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Observing Element Changes
//!
//! ```ignore
//! let mut updates = vacuum.accessory().subscribe();
//! while let Ok(update) = updates.recv().await {
//!     println!("{} {:?} = {:?}", update.element, update.characteristic, update.value);
//! }
//! ```

pub mod accessory;
mod capabilities;
pub mod command;
mod composer;
mod config;
pub mod device;
pub mod error;
pub mod features;
pub mod inventory;
pub mod momentary;
pub mod quantize;
pub mod state;
pub mod subscription;
pub mod telemetry;
pub mod types;

pub use capabilities::{Capabilities, Feature};
pub use command::DeviceCommand;
pub use composer::VacuumAccessory;
pub use config::{Config, MainServiceType, ZoneConfig};
pub use device::{DeviceControl, Room, Scene, VacuumDevice};
pub use error::{CommandError, Error, ParseError, Result, ValueError};
pub use inventory::{InventoryItem, InventoryReconciler, ReconcileOutcome};
pub use momentary::MomentaryAction;
pub use state::StateChangeEvent;
pub use subscription::{Dedup, KeyFilter, StateBus, SubscriptionId};
pub use types::{Percentage, StateCode};
