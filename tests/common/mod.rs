// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted device shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use roborock_bridge::accessory::{Accessory, MemoryNameStore, NameStore};
use roborock_bridge::{CommandError, Config, DeviceCommand, DeviceControl, Room, Scene, VacuumAccessory};
use serde_json::Value;

pub const DUID: &str = "integration-duid";

/// A robot whose snapshot, inventories and command outcome are scripted.
#[derive(Default)]
pub struct ScriptedDevice {
    status: Mutex<HashMap<String, Value>>,
    features: Mutex<HashSet<String>>,
    scenes: Mutex<Vec<Scene>>,
    rooms: Mutex<Vec<Room>>,
    sent: Mutex<Vec<DeviceCommand>>,
    failure: Mutex<Option<CommandError>>,
}

impl ScriptedDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_features(features: &[&str]) -> Arc<Self> {
        let device = Self::default();
        device
            .features
            .lock()
            .extend(features.iter().map(ToString::to_string));
        Arc::new(device)
    }

    /// Merges a `[{ key: value }]` payload into the snapshot, like the
    /// transport does before it notifies the bridge.
    pub fn apply(&self, payload: &Value) {
        if let Some(Value::Object(values)) = payload.get(0) {
            let mut status = self.status.lock();
            for (key, value) in values {
                status.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn set_scenes(&self, scenes: Vec<Scene>) {
        *self.scenes.lock() = scenes;
    }

    pub fn set_rooms(&self, rooms: Vec<Room>) {
        *self.rooms.lock() = rooms;
    }

    pub fn fail_with(&self, error: CommandError) {
        *self.failure.lock() = Some(error);
    }

    pub fn succeed(&self) {
        *self.failure.lock() = None;
    }

    pub fn sent(&self) -> Vec<DeviceCommand> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl DeviceControl for ScriptedDevice {
    fn device_id(&self) -> &str {
        DUID
    }

    fn status(&self, key: &str) -> Option<Value> {
        self.status.lock().get(key).cloned()
    }

    fn info(&self, _key: &str) -> Option<Value> {
        None
    }

    fn product_attribute(&self, _key: &str) -> Option<Value> {
        None
    }

    fn has_feature(&self, feature: &str) -> bool {
        self.features.lock().contains(feature)
    }

    async fn scenes(&self) -> Result<Vec<Scene>, CommandError> {
        Ok(self.scenes.lock().clone())
    }

    async fn room_list(&self) -> Result<Vec<Room>, CommandError> {
        Ok(self.rooms.lock().clone())
    }

    async fn send(&self, command: &DeviceCommand) -> Result<(), CommandError> {
        self.sent.lock().push(command.clone());
        let failure = self.failure.lock().clone();
        failure.map_or(Ok(()), Err)
    }
}

/// A composed and initialized bridge around a scripted device.
pub struct Bridge {
    pub device: Arc<ScriptedDevice>,
    pub vacuum: VacuumAccessory,
    pub names: Arc<MemoryNameStore>,
}

impl Bridge {
    pub fn new(config: Config, device: Arc<ScriptedDevice>) -> Self {
        Self::with_names(config, device, Arc::new(MemoryNameStore::new()))
    }

    pub fn with_names(config: Config, device: Arc<ScriptedDevice>, names: Arc<MemoryNameStore>) -> Self {
        let store: Arc<dyn NameStore> = names.clone();
        let accessory = Arc::new(Accessory::new(DUID, config.name.clone(), store));
        let control: Arc<dyn DeviceControl> = device.clone();
        let vacuum = VacuumAccessory::new(config, control, accessory).expect("valid config");
        vacuum.init();
        Self { device, vacuum, names }
    }

    pub fn accessory(&self) -> &Arc<Accessory> {
        self.vacuum.accessory()
    }

    /// Updates the snapshot and routes the push through the bridge.
    pub fn push(&self, payload: Value) {
        self.device.apply(&payload);
        self.vacuum.notify_device_update("LocalMessage", &payload);
    }
}
