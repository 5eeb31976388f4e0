// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device modes and their quantization tables.

use super::{Bucket, DeviceMode, QuantizationTable};

/// Suction power (`fan_power`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanPower {
    /// 105, suction off (mop only).
    Off,
    /// 101
    Quiet,
    /// 102
    Balanced,
    /// 103
    Turbo,
    /// 104
    Max,
    /// 108, reported by newer models but never selected.
    MaxPlus,
}

impl FanPower {
    /// Percentage mapping for suction power.
    pub const TABLE: QuantizationTable<Self> = QuantizationTable::new(
        &[
            Bucket::new(0, Self::Off, 0),
            Bucket::new(25, Self::Quiet, 25),
            Bucket::new(50, Self::Balanced, 50),
            Bucket::new(75, Self::Turbo, 75),
            Bucket::new(100, Self::Max, 100),
        ],
        &[(Self::MaxPlus, 100)],
        Self::Balanced,
    );
}

impl DeviceMode for FanPower {
    fn code(self) -> i64 {
        match self {
            Self::Off => 105,
            Self::Quiet => 101,
            Self::Balanced => 102,
            Self::Turbo => 103,
            Self::Max => 104,
            Self::MaxPlus => 108,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            105 => Some(Self::Off),
            101 => Some(Self::Quiet),
            102 => Some(Self::Balanced),
            103 => Some(Self::Turbo),
            104 => Some(Self::Max),
            108 => Some(Self::MaxPlus),
            _ => None,
        }
    }
}

/// Water flow of the mop (`water_box_custom_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterMode {
    /// 200
    Off,
    /// 201
    Mild,
    /// 202
    Standard,
    /// 203
    Intense,
}

impl WaterMode {
    /// Percentage mapping for water flow.
    pub const TABLE: QuantizationTable<Self> = QuantizationTable::new(
        &[
            Bucket::new(0, Self::Off, 0),
            Bucket::new(33, Self::Mild, 33),
            Bucket::new(67, Self::Standard, 67),
            Bucket::new(100, Self::Intense, 100),
        ],
        &[],
        Self::Standard,
    );
}

impl DeviceMode for WaterMode {
    fn code(self) -> i64 {
        match self {
            Self::Off => 200,
            Self::Mild => 201,
            Self::Standard => 202,
            Self::Intense => 203,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            200 => Some(Self::Off),
            201 => Some(Self::Mild),
            202 => Some(Self::Standard),
            203 => Some(Self::Intense),
            _ => None,
        }
    }
}

/// Mop route (`mop_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MopMode {
    /// 300
    Standard,
    /// 301
    Deep,
    /// 303
    DeepPlus,
    /// 304
    Fast,
}

impl MopMode {
    /// Percentage mapping for the mop route.
    pub const TABLE: QuantizationTable<Self> = QuantizationTable::new(
        &[
            Bucket::new(12, Self::Standard, 0),
            Bucket::new(37, Self::Deep, 25),
            Bucket::new(62, Self::DeepPlus, 50),
            Bucket::new(100, Self::Fast, 75),
        ],
        &[],
        Self::Standard,
    );
}

impl DeviceMode for MopMode {
    fn code(self) -> i64 {
        match self {
            Self::Standard => 300,
            Self::Deep => 301,
            Self::DeepPlus => 303,
            Self::Fast => 304,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            300 => Some(Self::Standard),
            301 => Some(Self::Deep),
            303 => Some(Self::DeepPlus),
            304 => Some(Self::Fast),
            _ => None,
        }
    }
}

/// Behaviour on carpets (`carpet_clean_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarpetCleanMode {
    /// 0
    Avoid,
    /// 1, lift the mop.
    Rise,
    /// 2
    Ignore,
}

impl CarpetCleanMode {
    /// Percentage mapping for carpet handling.
    pub const TABLE: QuantizationTable<Self> = QuantizationTable::new(
        &[
            Bucket::new(33, Self::Avoid, 0),
            Bucket::new(66, Self::Rise, 50),
            Bucket::new(100, Self::Ignore, 100),
        ],
        &[],
        Self::Rise,
    );
}

impl DeviceMode for CarpetCleanMode {
    fn code(self) -> i64 {
        match self {
            Self::Avoid => 0,
            Self::Rise => 1,
            Self::Ignore => 2,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Avoid),
            1 => Some(Self::Rise),
            2 => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// Mop wash intensity of the dock (`wash_towel_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WashTowelMode {
    /// 0
    Eco,
    /// 1
    Medium,
    /// 2
    Intense,
}

impl WashTowelMode {
    /// Percentage mapping for the wash intensity.
    pub const TABLE: QuantizationTable<Self> = QuantizationTable::new(
        &[
            Bucket::new(33, Self::Eco, 0),
            Bucket::new(66, Self::Medium, 50),
            Bucket::new(100, Self::Intense, 100),
        ],
        &[],
        Self::Medium,
    );
}

impl DeviceMode for WashTowelMode {
    fn code(self) -> i64 {
        match self {
            Self::Eco => 0,
            Self::Medium => 1,
            Self::Intense => 2,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Eco),
            1 => Some(Self::Medium),
            2 => Some(Self::Intense),
            _ => None,
        }
    }
}

/// Mop drying time of the dock, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DryerDuration {
    /// 7200
    TwoHours,
    /// 10800
    ThreeHours,
    /// 14400
    FourHours,
}

impl DryerDuration {
    /// Percentage mapping for the drying time.
    pub const TABLE: QuantizationTable<Self> = QuantizationTable::new(
        &[
            Bucket::new(33, Self::TwoHours, 0),
            Bucket::new(66, Self::ThreeHours, 50),
            Bucket::new(100, Self::FourHours, 100),
        ],
        &[],
        Self::ThreeHours,
    );

    /// Returns the duration in seconds.
    #[must_use]
    pub fn seconds(self) -> i64 {
        self.code()
    }
}

impl DeviceMode for DryerDuration {
    fn code(self) -> i64 {
        match self {
            Self::TwoHours => 7200,
            Self::ThreeHours => 10800,
            Self::FourHours => 14400,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            7200 => Some(Self::TwoHours),
            10800 => Some(Self::ThreeHours),
            14400 => Some(Self::FourHours),
            _ => None,
        }
    }
}
