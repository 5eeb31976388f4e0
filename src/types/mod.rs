// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the feature modules.
//!
//! # Types
//!
//! - [`Percentage`] - Level characteristics (0-100%)
//! - [`StateCode`] - Robot operating state from the `state` telemetry key

mod percentage;
mod state_code;

pub use percentage::Percentage;
pub use state_code::StateCode;
