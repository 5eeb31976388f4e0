// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory device used by unit tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{DeviceControl, Room, Scene};
use crate::command::DeviceCommand;
use crate::error::CommandError;

#[derive(Default)]
pub(crate) struct FakeDevice {
    status: Mutex<HashMap<String, Value>>,
    info: Mutex<HashMap<String, Value>>,
    attributes: Mutex<HashMap<String, Value>>,
    features: Mutex<HashSet<String>>,
    scenes: Mutex<Vec<Scene>>,
    rooms: Mutex<Vec<Room>>,
    sent: Mutex<Vec<DeviceCommand>>,
    failure: Mutex<Option<CommandError>>,
    scene_failure: Mutex<Option<CommandError>>,
}

impl FakeDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_features(features: &[&str]) -> Self {
        let fake = Self::new();
        fake.features
            .lock()
            .extend(features.iter().map(ToString::to_string));
        fake
    }

    pub(crate) fn set_status(&self, key: &str, value: Value) {
        self.status.lock().insert(key.to_string(), value);
    }

    pub(crate) fn set_info(&self, key: &str, value: Value) {
        self.info.lock().insert(key.to_string(), value);
    }

    pub(crate) fn set_attribute(&self, key: &str, value: Value) {
        self.attributes.lock().insert(key.to_string(), value);
    }

    pub(crate) fn set_scenes(&self, scenes: Vec<Scene>) {
        *self.scenes.lock() = scenes;
    }

    pub(crate) fn set_rooms(&self, rooms: Vec<Room>) {
        *self.rooms.lock() = rooms;
    }

    pub(crate) fn fail_with(&self, error: CommandError) {
        *self.failure.lock() = Some(error);
    }

    pub(crate) fn fail_scenes_with(&self, error: CommandError) {
        *self.scene_failure.lock() = Some(error);
    }

    pub(crate) fn succeed(&self) {
        *self.failure.lock() = None;
    }

    pub(crate) fn sent(&self) -> Vec<DeviceCommand> {
        self.sent.lock().clone()
    }

    pub(crate) fn clear_sent(&self) {
        self.sent.lock().clear();
    }
}

#[async_trait]
impl DeviceControl for FakeDevice {
    fn device_id(&self) -> &str {
        "fake-duid"
    }

    fn status(&self, key: &str) -> Option<Value> {
        self.status.lock().get(key).cloned()
    }

    fn info(&self, key: &str) -> Option<Value> {
        self.info.lock().get(key).cloned()
    }

    fn product_attribute(&self, key: &str) -> Option<Value> {
        self.attributes.lock().get(key).cloned()
    }

    fn has_feature(&self, feature: &str) -> bool {
        self.features.lock().contains(feature)
    }

    async fn scenes(&self) -> Result<Vec<Scene>, CommandError> {
        let failure = self.scene_failure.lock().clone();
        match failure {
            Some(err) => Err(err),
            None => Ok(self.scenes.lock().clone()),
        }
    }

    async fn room_list(&self) -> Result<Vec<Room>, CommandError> {
        Ok(self.rooms.lock().clone())
    }

    async fn send(&self, command: &DeviceCommand) -> Result<(), CommandError> {
        self.sent.lock().push(command.clone());
        let failure = self.failure.lock().clone();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
