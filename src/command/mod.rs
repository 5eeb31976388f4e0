// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device command definitions.
//!
//! Every command maps to one remote procedure call on the robot: a method
//! name plus JSON parameters. The transport that carries them is provided
//! by the [`DeviceControl`](crate::device::DeviceControl) implementation.
//!
//! # Available Commands
//!
//! | Group | Commands |
//! |-------|----------|
//! | Cleaning | start, stop, pause, return to dock, spot, zoned, segment |
//! | Suction / mop | fan power, water box mode, mop mode |
//! | Carpet | carpet boost, carpet clean mode |
//! | Settings | LED, flow LED, sound volume, child lock, do-not-disturb |
//! | Dock | dust collection, mop wash, wash intensity, dryer |
//! | Misc | find me, execute scene |
//!
//! # Examples
//!
//! ```
//! use roborock_bridge::command::DeviceCommand;
//! use roborock_bridge::quantize::FanPower;
//! use serde_json::json;
//!
//! let cmd = DeviceCommand::FanPower(FanPower::Turbo);
//! assert_eq!(cmd.method(), "set_custom_mode");
//! assert_eq!(cmd.params(), json!([103]));
//!
//! let rooms = DeviceCommand::SegmentClean(vec![16, 17]);
//! assert_eq!(rooms.method(), "app_segment_clean");
//! assert_eq!(rooms.params(), json!([16, 17]));
//! ```

mod settings;

pub use settings::{CarpetSettings, DndWindow, DryerSettings, Zone, reported_wash_mode};

use std::fmt;

use serde_json::{Value, json};

use crate::quantize::{CarpetCleanMode, DeviceMode, FanPower, MopMode, WashTowelMode, WaterMode};
use crate::types::Percentage;

/// A command sent to the robot.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Start a full clean, or resume.
    Start,
    /// Stop the current job.
    Stop,
    /// Pause the current job.
    Pause,
    /// Return to the dock.
    ReturnToDock,
    /// Clean around the current position.
    SpotClean,
    /// Clean the given areas.
    ZonedClean(Vec<Zone>),
    /// Clean the given rooms (segment ids).
    SegmentClean(Vec<u32>),
    /// Make the robot announce itself.
    FindMe,
    /// Set suction power.
    FanPower(FanPower),
    /// Set water flow.
    WaterBoxMode(WaterMode),
    /// Set the mop route.
    MopMode(MopMode),
    /// Write carpet boost settings.
    CarpetMode(CarpetSettings),
    /// Set carpet handling.
    CarpetCleanMode(CarpetCleanMode),
    /// Switch the status LED.
    LedStatus(bool),
    /// Switch the flow LED.
    FlowLedStatus(bool),
    /// Set the voice volume.
    SoundVolume(Percentage),
    /// Switch the child lock.
    ChildLock(bool),
    /// Enable do-not-disturb for a window.
    SetDndTimer(DndWindow),
    /// Disable do-not-disturb.
    CloseDndTimer,
    /// Start emptying the dust bin into the dock.
    StartDustCollection,
    /// Stop emptying the dust bin.
    StopDustCollection,
    /// Start washing the mop.
    StartMopWash,
    /// Stop washing the mop.
    StopMopWash,
    /// Set the mop wash intensity.
    WashTowelMode(WashTowelMode),
    /// Switch the mop dryer.
    DryerStatus(bool),
    /// Write dryer settings.
    DryerSetting(DryerSettings),
    /// Run a scene (routine) by id.
    ExecuteScene(u64),
}

impl DeviceCommand {
    /// Returns the remote method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Start => "app_start",
            Self::Stop => "app_stop",
            Self::Pause => "app_pause",
            Self::ReturnToDock => "app_charge",
            Self::SpotClean => "app_spot",
            Self::ZonedClean(_) => "app_zoned_clean",
            Self::SegmentClean(_) => "app_segment_clean",
            Self::FindMe => "find_me",
            Self::FanPower(_) => "set_custom_mode",
            Self::WaterBoxMode(_) => "set_water_box_custom_mode",
            Self::MopMode(_) => "set_mop_mode",
            Self::CarpetMode(_) => "set_carpet_mode",
            Self::CarpetCleanMode(_) => "set_carpet_clean_mode",
            Self::LedStatus(_) => "set_led_status",
            Self::FlowLedStatus(_) => "set_flow_led_status",
            Self::SoundVolume(_) => "change_sound_volume",
            Self::ChildLock(_) => "set_child_lock_status",
            Self::SetDndTimer(_) => "set_dnd_timer",
            Self::CloseDndTimer => "close_dnd_timer",
            Self::StartDustCollection => "app_start_collect_dust",
            Self::StopDustCollection => "app_stop_collect_dust",
            Self::StartMopWash => "app_start_wash",
            Self::StopMopWash => "app_stop_wash",
            Self::WashTowelMode(_) => "set_wash_towel_mode",
            Self::DryerStatus(_) => "app_set_dryer_status",
            Self::DryerSetting(_) => "app_set_dryer_setting",
            Self::ExecuteScene(_) => "execute_scene",
        }
    }

    /// Returns the remote parameters.
    #[must_use]
    pub fn params(&self) -> Value {
        match self {
            Self::Start
            | Self::Stop
            | Self::Pause
            | Self::ReturnToDock
            | Self::SpotClean
            | Self::FindMe
            | Self::CloseDndTimer
            | Self::StartDustCollection
            | Self::StopDustCollection
            | Self::StartMopWash
            | Self::StopMopWash => json!([]),
            Self::ZonedClean(zones) => json!(zones),
            Self::SegmentClean(rooms) => json!(rooms),
            Self::FanPower(mode) => json!([mode.code()]),
            Self::WaterBoxMode(mode) => json!([mode.code()]),
            Self::MopMode(mode) => json!([mode.code()]),
            Self::CarpetMode(settings) => settings.params(),
            Self::CarpetCleanMode(mode) => json!({ "carpet_clean_mode": mode.code() }),
            Self::LedStatus(on) => json!([i32::from(*on)]),
            Self::FlowLedStatus(on) => json!({ "status": i32::from(*on) }),
            Self::SoundVolume(volume) => json!([volume.value()]),
            Self::ChildLock(on) => json!({ "lock_status": i32::from(*on) }),
            Self::SetDndTimer(window) => window.params(),
            Self::WashTowelMode(mode) => settings::wash_towel_params(*mode),
            Self::DryerStatus(on) => json!({ "status": i32::from(*on) }),
            Self::DryerSetting(settings) => settings.params(),
            Self::ExecuteScene(id) => json!({ "val": id }),
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::DryerDuration;

    #[test]
    fn simple_commands_have_empty_params() {
        for cmd in [
            DeviceCommand::Start,
            DeviceCommand::ReturnToDock,
            DeviceCommand::FindMe,
            DeviceCommand::StartDustCollection,
        ] {
            assert_eq!(cmd.params(), json!([]));
        }
        assert_eq!(DeviceCommand::ReturnToDock.method(), "app_charge");
    }

    #[test]
    fn mode_commands_send_codes() {
        assert_eq!(DeviceCommand::WaterBoxMode(WaterMode::Mild).params(), json!([201]));
        assert_eq!(DeviceCommand::MopMode(MopMode::DeepPlus).params(), json!([303]));
        assert_eq!(
            DeviceCommand::WashTowelMode(WashTowelMode::Intense).params(),
            json!({"wash_mode": 2})
        );
        assert_eq!(
            DeviceCommand::CarpetCleanMode(CarpetCleanMode::Ignore).params(),
            json!({"carpet_clean_mode": 2})
        );
    }

    #[test]
    fn zoned_clean_params() {
        let cmd = DeviceCommand::ZonedClean(vec![Zone::from([1, 2, 3, 4, 1]), Zone::from([5, 6, 7, 8, 2])]);
        assert_eq!(cmd.params(), json!([[1, 2, 3, 4, 1], [5, 6, 7, 8, 2]]));
    }

    #[test]
    fn switch_commands() {
        assert_eq!(DeviceCommand::LedStatus(true).params(), json!([1]));
        assert_eq!(DeviceCommand::ChildLock(false).params(), json!({"lock_status": 0}));
        assert_eq!(DeviceCommand::DryerStatus(true).params(), json!({"status": 1}));
    }

    #[test]
    fn dryer_setting_params() {
        let cmd = DeviceCommand::DryerSetting(DryerSettings::from_status(None, DryerDuration::ThreeHours));
        assert_eq!(cmd.params(), json!({"on": {"dry_time": 10800}, "status": 1}));
    }

    #[test]
    fn display() {
        assert_eq!(
            DeviceCommand::SoundVolume(Percentage::clamped(40)).to_string(),
            "change_sound_volume [40]"
        );
    }
}
