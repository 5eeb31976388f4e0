// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device bridge configuration.
//!
//! The configuration is usually read from the bridge's JSON settings, whose
//! keys are camel case (`serviceType`, `roomTimeout`, ...). Every field has a
//! default, so an empty object is a valid configuration.

use std::time::Duration;

use crate::command::Zone;
use crate::device::Room;
use crate::error::{Error, ParseError, Result};

/// Default momentary reset delay in milliseconds.
const DEFAULT_MOMENTARY_RESET_MS: u64 = 1000;

/// Element type of the main cleaning control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MainServiceType {
    /// Fan with on/off and suction power as rotation speed.
    #[default]
    Fan,
    /// Plain on/off switch.
    Switch,
}

/// A named set of areas cleaned together.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ZoneConfig {
    /// Zone name, also used in the element id.
    pub name: String,
    /// Areas as `[x1, y1, x2, y2, repeats]`.
    pub zone: Vec<Zone>,
}

/// Configuration for one vacuum accessory.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use roborock_bridge::{Config, MainServiceType};
///
/// let config = Config::from_json(r#"{
///     "name": "Robbie",
///     "serviceType": "switch",
///     "pause": true,
///     "roomTimeout": 30,
///     "rooms": [{ "id": 16, "name": "Kitchen" }]
/// }"#).unwrap();
///
/// assert_eq!(config.service_type, MainServiceType::Switch);
/// assert_eq!(config.room_timeout(), Some(Duration::from_secs(30)));
/// assert_eq!(config.pause_name(), "Robbie Pause");
/// assert!(config.water_box);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", default)]
// Each boolean enables an independent element.
#[allow(clippy::struct_excessive_bools)]
pub struct Config {
    /// Name of the main element; prefixes most other names.
    pub name: String,
    /// Element type of the main cleaning control.
    pub service_type: MainServiceType,
    /// Word prefixed to room and zone switch names.
    pub cleanword: String,
    /// Expose a pause switch.
    pub pause: bool,
    /// Suffix of the pause switch name.
    pub pause_word: String,
    /// Expose a find-me switch.
    pub find_me: bool,
    /// Suffix of the find-me switch name.
    pub find_me_word: String,
    /// Seconds after the last room selection before cleaning starts on its
    /// own; 0 disables.
    pub room_timeout: u64,
    /// Rooms exposed before the device lists its own.
    pub rooms: Vec<Room>,
    /// Room switches start cleaning that room right away instead of
    /// building a selection.
    pub instant_room_clean: bool,
    /// Expose the water box control when the model supports it.
    pub water_box: bool,
    /// Expose the dock occupancy sensor.
    pub dock: bool,
    /// Zone switches.
    pub zones: Vec<ZoneConfig>,
    /// Expose the dust collection switch when the dock supports it.
    pub dust_collection: bool,
    /// Expose scene switches.
    pub scenes: bool,
    /// Expose return-to-dock and spot clean switches.
    pub actions: bool,
    /// Expose the error contact sensor.
    pub error_sensor: bool,
    /// Expose LED, child lock, do-not-disturb and similar switches.
    pub device_settings: bool,
    /// Expose mop, carpet, wash and dryer level controls.
    pub level_controls: bool,
    /// Expose the voice volume control.
    pub sound_volume: bool,
    /// Milliseconds before a momentary switch turns itself off.
    pub momentary_reset_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "Roborock Vacuum".to_string(),
            service_type: MainServiceType::Fan,
            cleanword: "cleaning".to_string(),
            pause: false,
            pause_word: "Pause".to_string(),
            find_me: false,
            find_me_word: "where are you".to_string(),
            room_timeout: 0,
            rooms: Vec::new(),
            instant_room_clean: false,
            water_box: true,
            dock: true,
            zones: Vec::new(),
            dust_collection: false,
            scenes: true,
            actions: true,
            error_sensor: true,
            device_settings: true,
            level_controls: true,
            sound_volume: true,
            momentary_reset_ms: DEFAULT_MOMENTARY_RESET_MS,
        }
    }
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` for malformed JSON and `Error::Config` for
    /// values that cannot work (empty name, zone without areas).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ParseError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("name must not be empty".to_string()));
        }
        if let Some(zone) = self.zones.iter().find(|z| z.zone.is_empty()) {
            return Err(Error::Config(format!("zone '{}' has no areas", zone.name)));
        }
        Ok(())
    }

    /// Sets the accessory name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the main element type.
    #[must_use]
    pub fn with_service_type(mut self, service_type: MainServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    /// Enables the pause switch.
    #[must_use]
    pub fn with_pause(mut self, enabled: bool) -> Self {
        self.pause = enabled;
        self
    }

    /// Enables the find-me switch.
    #[must_use]
    pub fn with_find_me(mut self, enabled: bool) -> Self {
        self.find_me = enabled;
        self
    }

    /// Sets the configured rooms.
    #[must_use]
    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = rooms;
        self
    }

    /// Sets the room auto-start delay.
    #[must_use]
    pub fn with_room_timeout(mut self, timeout: Duration) -> Self {
        self.room_timeout = timeout.as_secs();
        self
    }

    /// Makes room switches start cleaning right away.
    #[must_use]
    pub fn with_instant_room_clean(mut self, enabled: bool) -> Self {
        self.instant_room_clean = enabled;
        self
    }

    /// Adds a zone switch.
    #[must_use]
    pub fn with_zone(mut self, name: impl Into<String>, zone: Vec<Zone>) -> Self {
        self.zones.push(ZoneConfig {
            name: name.into(),
            zone,
        });
        self
    }

    /// Enables the dust collection switch.
    #[must_use]
    pub fn with_dust_collection(mut self, enabled: bool) -> Self {
        self.dust_collection = enabled;
        self
    }

    /// Sets the momentary reset delay.
    #[must_use]
    pub fn with_momentary_reset(mut self, delay: Duration) -> Self {
        self.momentary_reset_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the room auto-start delay, `None` when disabled.
    #[must_use]
    pub fn room_timeout(&self) -> Option<Duration> {
        (self.room_timeout > 0).then(|| Duration::from_secs(self.room_timeout))
    }

    /// Returns the momentary reset delay.
    #[must_use]
    pub fn momentary_reset(&self) -> Duration {
        Duration::from_millis(self.momentary_reset_ms)
    }

    /// Name of the pause switch.
    #[must_use]
    pub fn pause_name(&self) -> String {
        format!("{} {}", self.name, self.pause_word)
    }

    /// Name of the find-me switch.
    #[must_use]
    pub fn find_me_name(&self) -> String {
        format!("{} {}", self.name, self.find_me_word)
    }

    /// Name of the dock sensor.
    #[must_use]
    pub fn dock_name(&self) -> String {
        format!("{} Dock", self.name)
    }

    /// Name of the water box control.
    #[must_use]
    pub fn water_box_name(&self) -> String {
        format!("{} Water Box", self.name)
    }

    /// Name of a room or zone switch.
    #[must_use]
    pub fn clean_name(&self, target: &str) -> String {
        format!("{} {}", self.cleanword, target)
    }
}
