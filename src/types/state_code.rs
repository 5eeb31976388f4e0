// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Robot operating state.

use std::fmt;

use serde_json::Value;

/// Operating state reported under the `state` telemetry key.
///
/// Codes without a known meaning are preserved as [`StateCode::Other`].
///
/// # Examples
///
/// ```
/// use roborock_bridge::types::StateCode;
///
/// let state = StateCode::from_code(18);
/// assert_eq!(state, StateCode::RoomClean);
/// assert!(state.is_cleaning());
///
/// assert!(StateCode::Paused.is_paused());
/// assert!(!StateCode::Paused.is_cleaning());
/// assert!(StateCode::Charging.is_docked());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateCode {
    /// 0, or no state reported yet.
    #[default]
    Unknown,
    /// 1
    Initiating,
    /// 2
    Sleeping,
    /// 3
    Idle,
    /// 4
    RemoteControl,
    /// 5
    Cleaning,
    /// 6
    ReturningDock,
    /// 7
    ManualMode,
    /// 8
    Charging,
    /// 9
    ChargingError,
    /// 10
    Paused,
    /// 11
    SpotCleaning,
    /// 12
    InError,
    /// 13
    ShuttingDown,
    /// 14
    Updating,
    /// 15
    Docking,
    /// 16
    GoTo,
    /// 17
    ZoneClean,
    /// 18
    RoomClean,
    /// 22
    EmptyingDustContainer,
    /// 23
    WashingMop,
    /// 26
    GoingToWashMop,
    /// 28
    InCall,
    /// 29
    Mapping,
    /// 100
    FullyCharged,
    /// Any code not listed above.
    Other(i64),
}

impl StateCode {
    /// Maps a raw state code.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::Initiating,
            2 => Self::Sleeping,
            3 => Self::Idle,
            4 => Self::RemoteControl,
            5 => Self::Cleaning,
            6 => Self::ReturningDock,
            7 => Self::ManualMode,
            8 => Self::Charging,
            9 => Self::ChargingError,
            10 => Self::Paused,
            11 => Self::SpotCleaning,
            12 => Self::InError,
            13 => Self::ShuttingDown,
            14 => Self::Updating,
            15 => Self::Docking,
            16 => Self::GoTo,
            17 => Self::ZoneClean,
            18 => Self::RoomClean,
            22 => Self::EmptyingDustContainer,
            23 => Self::WashingMop,
            26 => Self::GoingToWashMop,
            28 => Self::InCall,
            29 => Self::Mapping,
            100 => Self::FullyCharged,
            other => Self::Other(other),
        }
    }

    /// Reads a state code from a telemetry value.
    ///
    /// Missing or non-numeric values are [`StateCode::Unknown`].
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_i64)
            .map_or(Self::Unknown, Self::from_code)
    }

    /// Returns the raw code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Initiating => 1,
            Self::Sleeping => 2,
            Self::Idle => 3,
            Self::RemoteControl => 4,
            Self::Cleaning => 5,
            Self::ReturningDock => 6,
            Self::ManualMode => 7,
            Self::Charging => 8,
            Self::ChargingError => 9,
            Self::Paused => 10,
            Self::SpotCleaning => 11,
            Self::InError => 12,
            Self::ShuttingDown => 13,
            Self::Updating => 14,
            Self::Docking => 15,
            Self::GoTo => 16,
            Self::ZoneClean => 17,
            Self::RoomClean => 18,
            Self::EmptyingDustContainer => 22,
            Self::WashingMop => 23,
            Self::GoingToWashMop => 26,
            Self::InCall => 28,
            Self::Mapping => 29,
            Self::FullyCharged => 100,
            Self::Other(code) => *code,
        }
    }

    /// Returns `true` while a cleaning job is active, including the trips to
    /// and from the dock that belong to it.
    #[must_use]
    pub const fn is_cleaning(&self) -> bool {
        matches!(
            self,
            Self::RemoteControl
                | Self::Cleaning
                | Self::ReturningDock
                | Self::ManualMode
                | Self::SpotCleaning
                | Self::Docking
                | Self::GoTo
                | Self::ZoneClean
                | Self::RoomClean
                | Self::WashingMop
                | Self::GoingToWashMop
        )
    }

    /// Returns `true` when a job is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Returns `true` when the robot sits in the dock.
    #[must_use]
    pub const fn is_docked(&self) -> bool {
        matches!(self, Self::Charging)
    }

    /// Returns a human readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unknown | Self::Other(_) => "Unknown",
            Self::Initiating => "Initiating",
            Self::Sleeping => "Sleeping",
            Self::Idle => "Idle",
            Self::RemoteControl => "Remote Control",
            Self::Cleaning => "Cleaning",
            Self::ReturningDock => "Returning Dock",
            Self::ManualMode => "Manual Mode",
            Self::Charging => "Charging",
            Self::ChargingError => "Charging Error",
            Self::Paused => "Paused",
            Self::SpotCleaning => "Spot Cleaning",
            Self::InError => "In Error",
            Self::ShuttingDown => "Shutting Down",
            Self::Updating => "Updating",
            Self::Docking => "Docking",
            Self::GoTo => "Go To",
            Self::ZoneClean => "Zone Clean",
            Self::RoomClean => "Room Clean",
            Self::EmptyingDustContainer => "Emptying dust container",
            Self::WashingMop => "Washing the mop",
            Self::GoingToWashMop => "Going to wash the mop",
            Self::InCall => "In call",
            Self::Mapping => "Mapping",
            Self::FullyCharged => "Fully Charged",
        }
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}
