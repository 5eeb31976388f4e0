// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry keys of the device status report.

/// Operating state code, see [`StateCode`](crate::types::StateCode).
pub const STATE: &str = "state";
/// Battery level in percent.
pub const BATTERY: &str = "battery";
/// Charging status, non-zero while charging.
pub const CHARGE_STATUS: &str = "charge_status";
/// Non-zero while a job is running.
pub const IN_CLEANING: &str = "in_cleaning";
/// Suction power mode code.
pub const FAN_POWER: &str = "fan_power";
/// Water box (scrub intensity) mode code.
pub const WATER_BOX_MODE: &str = "water_box_custom_mode";
/// Mop route mode code.
pub const MOP_MODE: &str = "mop_mode";
/// Error code, 0 when healthy.
pub const ERROR_CODE: &str = "error_code";
/// Status LED, 1 when lit.
pub const LED_STATUS: &str = "led_status";
/// Dock flow LED, 1 when lit.
pub const FLOW_LED_STATUS: &str = "flow_led_status";
/// Voice volume 0-100.
pub const SOUND_VOLUME: &str = "sound_volume";
/// Child lock, 1 when engaged.
pub const CHILD_LOCK_STATUS: &str = "child_lock_status";
/// Do-not-disturb window object.
pub const DND_TIMER: &str = "dnd_timer";
/// Carpet boost settings, a one-element array of objects.
pub const CARPET_MODE: &str = "carpet_mode";
/// Carpet avoidance mode code.
pub const CARPET_CLEAN_MODE: &str = "carpet_clean_mode";
/// Mop wash status.
pub const WASH_STATUS: &str = "wash_status";
/// Wash intensity object with a `wash_mode` code.
pub const WASH_TOWEL_MODE: &str = "wash_towel_mode";
/// Mop dryer running flag.
pub const DRY_STATUS: &str = "dry_status";
/// Dryer settings object with `on.dry_time` seconds.
pub const DRYER_SETTING: &str = "dryer_setting";
