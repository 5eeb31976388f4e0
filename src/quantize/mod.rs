// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping between percentage controls and discrete device modes.
//!
//! The accessory model only knows continuous levels (rotation speed,
//! brightness) while the robot only accepts a handful of mode codes per
//! setting. A [`QuantizationTable`] maps between the two for one dimension.
//!
//! # Policy
//!
//! - Bucket bounds are inclusive upper bounds, checked in order; the final
//!   bucket's bound is 100 so every percentage lands in exactly one bucket.
//! - Each bucket has a canonical percentage that maps back to the bucket's
//!   mode, so `to_percentage(to_device_mode(p))` is stable on canonical
//!   points and lands in the same bucket everywhere else.
//! - A code the table does not know maps to the table's default bucket.
//!
//! # Examples
//!
//! ```
//! use roborock_bridge::quantize::{FanPower, WaterMode};
//! use roborock_bridge::types::Percentage;
//!
//! let quiet = FanPower::TABLE.to_device_mode(Percentage::clamped(25));
//! assert_eq!(quiet, FanPower::Quiet);
//! assert_eq!(FanPower::TABLE.to_percentage(101).value(), 25);
//!
//! let standard = WaterMode::TABLE.to_device_mode(Percentage::clamped(50));
//! assert_eq!(standard, WaterMode::Standard);
//! assert_eq!(WaterMode::TABLE.to_percentage(202).value(), 67);
//! ```

mod modes;

pub use modes::{CarpetCleanMode, DryerDuration, FanPower, MopMode, WashTowelMode, WaterMode};

use std::fmt;

use crate::types::Percentage;

/// A discrete setting level with a protocol code.
pub trait DeviceMode: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Returns the protocol code sent to and reported by the device.
    fn code(self) -> i64;

    /// Maps a protocol code back to a mode.
    fn from_code(code: i64) -> Option<Self>;
}

/// One bucket of a [`QuantizationTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket<M> {
    /// Inclusive upper bound of the bucket.
    pub upper: u8,
    /// Mode selected by percentages in the bucket.
    pub mode: M,
    /// Percentage reported for the mode.
    pub percentage: u8,
}

impl<M> Bucket<M> {
    /// Creates a bucket.
    #[must_use]
    pub const fn new(upper: u8, mode: M, percentage: u8) -> Self {
        Self {
            upper,
            mode,
            percentage,
        }
    }
}

/// Bidirectional map between percentages and the modes of one dimension.
#[derive(Debug, Clone, Copy)]
pub struct QuantizationTable<M: 'static> {
    buckets: &'static [Bucket<M>],
    aliases: &'static [(M, u8)],
    default: M,
}

impl<M: DeviceMode> QuantizationTable<M> {
    /// Creates a table from ordered buckets.
    ///
    /// `aliases` lists extra modes that only appear in telemetry (never
    /// selected by a percentage) together with the percentage they report.
    #[must_use]
    pub const fn new(buckets: &'static [Bucket<M>], aliases: &'static [(M, u8)], default: M) -> Self {
        Self {
            buckets,
            aliases,
            default,
        }
    }

    /// Selects the mode for a percentage.
    #[must_use]
    pub fn to_device_mode(&self, percentage: Percentage) -> M {
        let p = percentage.value();
        self.buckets
            .iter()
            .find(|bucket| p <= bucket.upper)
            .or_else(|| self.buckets.last())
            .map_or(self.default, |bucket| bucket.mode)
    }

    /// Snaps a percentage to the canonical percentage of its bucket.
    #[must_use]
    pub fn snap(&self, percentage: Percentage) -> Percentage {
        self.mode_percentage(self.to_device_mode(percentage))
    }

    /// Returns the percentage reported for a mode.
    #[must_use]
    pub fn mode_percentage(&self, mode: M) -> Percentage {
        let raw = self
            .buckets
            .iter()
            .find(|bucket| bucket.mode == mode)
            .map(|bucket| bucket.percentage)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|(alias, _)| *alias == mode)
                    .map(|(_, percentage)| *percentage)
            });
        match raw {
            Some(p) => Percentage::clamped(i64::from(p)),
            None => self.default_percentage(),
        }
    }

    /// Returns the percentage for a reported protocol code.
    ///
    /// Unknown codes map to the default bucket.
    #[must_use]
    pub fn to_percentage(&self, code: i64) -> Percentage {
        match M::from_code(code) {
            Some(mode) => self.mode_percentage(mode),
            None => {
                tracing::debug!(code, default = ?self.default, "Unknown mode code, using default");
                self.default_percentage()
            }
        }
    }

    /// Returns the default mode.
    #[must_use]
    pub fn default_mode(&self) -> M {
        self.default
    }

    /// Returns the percentage of the default mode.
    #[must_use]
    pub fn default_percentage(&self) -> Percentage {
        self.buckets
            .iter()
            .find(|bucket| bucket.mode == self.default)
            .map_or(Percentage::MIN, |bucket| {
                Percentage::clamped(i64::from(bucket.percentage))
            })
    }

    /// Returns the canonical percentage of every bucket, in order.
    pub fn canonical_percentages(&self) -> impl Iterator<Item = Percentage> + '_ {
        self.buckets
            .iter()
            .map(|bucket| Percentage::clamped(i64::from(bucket.percentage)))
    }

    /// Returns the buckets of the table.
    #[must_use]
    pub fn buckets(&self) -> &'static [Bucket<M>] {
        self.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(v: i64) -> Percentage {
        Percentage::clamped(v)
    }

    fn assert_total_and_monotonic<M: DeviceMode>(table: &QuantizationTable<M>) {
        let buckets = table.buckets();
        assert_eq!(buckets.last().map(|b| b.upper), Some(100));
        let index_of = |mode: M| buckets.iter().position(|b| b.mode == mode).unwrap();

        let mut previous = 0;
        for p in 0..=100 {
            let index = index_of(table.to_device_mode(pct(p)));
            assert!(index >= previous, "bucket order broken at {p}%");
            previous = index;
        }
    }

    fn assert_round_trips<M: DeviceMode>(table: &QuantizationTable<M>) {
        for canonical in table.canonical_percentages() {
            let mode = table.to_device_mode(canonical);
            assert_eq!(table.to_percentage(mode.code()), canonical);
        }
        for p in 0..=100 {
            let mode = table.to_device_mode(pct(p));
            let back = table.to_percentage(mode.code());
            assert_eq!(table.to_device_mode(back), mode, "{p}% left its bucket");
        }
    }

    #[test]
    fn fan_power_table() {
        let t = FanPower::TABLE;
        assert_eq!(t.to_device_mode(pct(0)), FanPower::Off);
        assert_eq!(t.to_device_mode(pct(1)), FanPower::Quiet);
        assert_eq!(t.to_device_mode(pct(25)), FanPower::Quiet);
        assert_eq!(t.to_device_mode(pct(26)), FanPower::Balanced);
        assert_eq!(t.to_device_mode(pct(50)), FanPower::Balanced);
        assert_eq!(t.to_device_mode(pct(75)), FanPower::Turbo);
        assert_eq!(t.to_device_mode(pct(76)), FanPower::Max);
        assert_eq!(t.to_device_mode(pct(100)), FanPower::Max);

        assert_eq!(t.to_percentage(105), pct(0));
        assert_eq!(t.to_percentage(101), pct(25));
        assert_eq!(t.to_percentage(102), pct(50));
        assert_eq!(t.to_percentage(103), pct(75));
        assert_eq!(t.to_percentage(104), pct(100));
        assert_eq!(t.to_percentage(108), pct(100));
        assert_eq!(t.to_percentage(999), pct(50));

        assert_eq!(t.snap(pct(37)), pct(50));
        assert_eq!(t.snap(pct(150)), pct(100));
        assert_eq!(t.snap(pct(1)), pct(25));

        assert_total_and_monotonic(&t);
        assert_round_trips(&t);
    }

    #[test]
    fn water_mode_table() {
        let t = WaterMode::TABLE;
        assert_eq!(t.to_device_mode(pct(0)), WaterMode::Off);
        assert_eq!(t.to_device_mode(pct(33)), WaterMode::Mild);
        assert_eq!(t.to_device_mode(pct(50)), WaterMode::Standard);
        assert_eq!(t.to_device_mode(pct(67)), WaterMode::Standard);
        assert_eq!(t.to_device_mode(pct(80)), WaterMode::Intense);

        assert_eq!(t.to_percentage(200), pct(0));
        assert_eq!(t.to_percentage(201), pct(33));
        assert_eq!(t.to_percentage(202), pct(67));
        assert_eq!(t.to_percentage(203), pct(100));
        assert_eq!(t.to_percentage(-1), pct(67));

        assert_total_and_monotonic(&t);
        assert_round_trips(&t);
    }

    #[test]
    fn mop_mode_table() {
        let t = MopMode::TABLE;
        assert_eq!(t.to_device_mode(pct(12)), MopMode::Standard);
        assert_eq!(t.to_device_mode(pct(13)), MopMode::Deep);
        assert_eq!(t.to_device_mode(pct(50)), MopMode::DeepPlus);
        assert_eq!(t.to_device_mode(pct(63)), MopMode::Fast);
        assert_eq!(t.to_percentage(303), pct(50));
        assert_eq!(t.to_percentage(302), pct(0));

        assert_total_and_monotonic(&t);
        assert_round_trips(&t);
    }

    #[test]
    fn three_bucket_tables() {
        assert_eq!(CarpetCleanMode::TABLE.to_device_mode(pct(33)), CarpetCleanMode::Avoid);
        assert_eq!(CarpetCleanMode::TABLE.to_device_mode(pct(66)), CarpetCleanMode::Rise);
        assert_eq!(CarpetCleanMode::TABLE.to_device_mode(pct(67)), CarpetCleanMode::Ignore);
        assert_eq!(CarpetCleanMode::TABLE.to_percentage(9), pct(50));

        assert_eq!(WashTowelMode::TABLE.to_device_mode(pct(0)), WashTowelMode::Eco);
        assert_eq!(WashTowelMode::TABLE.to_percentage(2), pct(100));
        assert_eq!(WashTowelMode::TABLE.to_percentage(7), pct(50));

        assert_eq!(DryerDuration::TABLE.to_device_mode(pct(90)), DryerDuration::FourHours);
        assert_eq!(DryerDuration::TABLE.to_percentage(7200), pct(0));
        assert_eq!(DryerDuration::TABLE.to_percentage(3600), pct(50));

        assert_total_and_monotonic(&CarpetCleanMode::TABLE);
        assert_round_trips(&CarpetCleanMode::TABLE);
        assert_total_and_monotonic(&WashTowelMode::TABLE);
        assert_round_trips(&WashTowelMode::TABLE);
        assert_total_and_monotonic(&DryerDuration::TABLE);
        assert_round_trips(&DryerDuration::TABLE);
    }

    #[test]
    fn defaults() {
        assert_eq!(FanPower::TABLE.default_mode(), FanPower::Balanced);
        assert_eq!(WaterMode::TABLE.default_percentage(), pct(67));
        assert_eq!(MopMode::TABLE.default_percentage(), pct(0));
        assert_eq!(DryerDuration::TABLE.default_mode(), DryerDuration::ThreeHours);
    }
}
