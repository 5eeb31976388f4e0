// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inventory entries listed by the device.

/// A scene (routine) defined in the vendor app.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Scene id.
    pub id: u64,
    /// Display name as entered by the user.
    pub name: String,
    /// Disabled scenes are not exposed.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl Scene {
    /// Creates an enabled scene.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
        }
    }

    /// Returns a copy with the enabled flag changed.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A room (map segment).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Room {
    /// Segment id used by segment cleaning.
    pub id: u32,
    /// Room name.
    pub name: String,
}

impl Room {
    /// Creates a room.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

fn enabled_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_enabled_defaults_to_true() {
        let scene: Scene = serde_json::from_str(r#"{"id": 7, "name": "Morning"}"#).unwrap();
        assert!(scene.enabled);
        assert_eq!(scene, Scene::new(7, "Morning"));
    }

    #[test]
    fn room_from_json() {
        let room: Room = serde_json::from_str(r#"{"id": 16, "name": "Kitchen"}"#).unwrap();
        assert_eq!(room, Room::new(16, "Kitchen"));
    }
}
