// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optional hardware features of a robot.
//!
//! Which UI elements exist depends on the model: a robot without a wash dock
//! gets no mop wash switch. Capabilities are probed once through
//! [`DeviceControl::has_feature`] when the accessory is composed, or set
//! by hand for tests and fixed setups.

use std::fmt;

use crate::device::DeviceControl;

/// A feature probed with [`DeviceControl::has_feature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Adjustable mop water flow.
    WaterLevel,
    /// Selectable mop route.
    MopMode,
    /// Switchable status LED.
    LedStatus,
    /// Child lock.
    ChildLock,
    /// Auto-empty dock.
    DustCollection,
    /// Carpet boost and carpet handling.
    CarpetMode,
    /// Switchable flow LED.
    FlowLed,
    /// Mop wash dock.
    Washing,
    /// Mop dryer in the dock.
    Drying,
}

impl Feature {
    /// Every feature.
    pub const ALL: [Self; 9] = [
        Self::WaterLevel,
        Self::MopMode,
        Self::LedStatus,
        Self::ChildLock,
        Self::DustCollection,
        Self::CarpetMode,
        Self::FlowLed,
        Self::Washing,
        Self::Drying,
    ];

    /// Returns the feature name passed to the device.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WaterLevel => "waterLevel",
            Self::MopMode => "mopMode",
            Self::LedStatus => "ledStatus",
            Self::ChildLock => "childLock",
            Self::DustCollection => "dustCollection",
            Self::CarpetMode => "carpetMode",
            Self::FlowLed => "flowLed",
            Self::Washing => "washing",
            Self::Drying => "drying",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features supported by a robot.
///
/// # Examples
///
/// ```
/// use roborock_bridge::{Capabilities, Feature};
///
/// let basic = Capabilities::default();
/// assert!(!basic.supports(Feature::Washing));
///
/// let dock = Capabilities::default()
///     .with(Feature::Washing)
///     .with(Feature::Drying);
/// assert!(dock.washing);
/// assert!(dock.supports(Feature::Drying));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
// Each boolean is an independent hardware flag.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Adjustable mop water flow.
    pub water_level: bool,
    /// Selectable mop route.
    pub mop_mode: bool,
    /// Switchable status LED.
    pub led_status: bool,
    /// Child lock.
    pub child_lock: bool,
    /// Auto-empty dock.
    pub dust_collection: bool,
    /// Carpet boost and carpet handling.
    pub carpet_mode: bool,
    /// Switchable flow LED.
    pub flow_led: bool,
    /// Mop wash dock.
    pub washing: bool,
    /// Mop dryer in the dock.
    pub drying: bool,
}

impl Capabilities {
    /// Capabilities with every feature enabled.
    #[must_use]
    pub fn all() -> Self {
        Feature::ALL
            .into_iter()
            .fold(Self::default(), Self::with)
    }

    /// Probes every feature on the device.
    #[must_use]
    pub fn detect(device: &dyn DeviceControl) -> Self {
        let caps = Feature::ALL
            .into_iter()
            .filter(|feature| device.has_feature(feature.as_str()))
            .fold(Self::default(), Self::with);
        tracing::debug!(device = %device.device_id(), capabilities = ?caps, "Detected capabilities");
        caps
    }

    /// Returns a copy with a feature enabled.
    #[must_use]
    pub fn with(mut self, feature: Feature) -> Self {
        *self.flag_mut(feature) = true;
        self
    }

    /// Returns `true` if the feature is supported.
    #[must_use]
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::WaterLevel => self.water_level,
            Feature::MopMode => self.mop_mode,
            Feature::LedStatus => self.led_status,
            Feature::ChildLock => self.child_lock,
            Feature::DustCollection => self.dust_collection,
            Feature::CarpetMode => self.carpet_mode,
            Feature::FlowLed => self.flow_led,
            Feature::Washing => self.washing,
            Feature::Drying => self.drying,
        }
    }

    fn flag_mut(&mut self, feature: Feature) -> &mut bool {
        match feature {
            Feature::WaterLevel => &mut self.water_level,
            Feature::MopMode => &mut self.mop_mode,
            Feature::LedStatus => &mut self.led_status,
            Feature::ChildLock => &mut self.child_lock,
            Feature::DustCollection => &mut self.dust_collection,
            Feature::CarpetMode => &mut self.carpet_mode,
            Feature::FlowLed => &mut self.flow_led,
            Feature::Washing => &mut self.washing,
            Feature::Drying => &mut self.drying,
        }
    }
}
