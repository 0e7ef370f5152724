// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for light control.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off power state
//! - [`Brightness`] - Raw brightness level (0-255) with tolerant matching
//! - [`ColorTemp`] - Color temperature in mireds
//! - [`TimeWindow`] - Daily `[start, end)` window that may cross midnight

mod brightness;
mod color_temp;
mod power;
mod time_window;

pub use brightness::Brightness;
pub use color_temp::ColorTemp;
pub use power::PowerState;
pub use time_window::{TimeWindow, parse_time_of_day};
