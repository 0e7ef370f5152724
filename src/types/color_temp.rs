// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color temperature type.
//!
//! Lower mired values are cooler (bluer), higher values warmer.
//!
//! - 250 (4000K) - Neutral white, the default cold scene
//! - 389 (2570K) - Warm white, the default warm scene
//! - 400 (2500K) - The default dimmed scene

use std::fmt;

/// Color temperature in mireds.
///
/// Values reported by a device are stored as-is. Scene targets taken from
/// configuration are checked against [`ColorTemp::MIN`] and
/// [`ColorTemp::MAX`] at load time.
///
/// # Examples
///
/// ```
/// use scenectl::types::ColorTemp;
///
/// let ct = ColorTemp::new(250);
/// assert_eq!(ct.value(), 250);
/// assert!(ct.is_in_range());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ColorTemp(u16);

impl ColorTemp {
    /// Smallest mired value accepted in configuration (~20000K).
    pub const MIN: u16 = 50;

    /// Largest mired value accepted in configuration (1000K).
    pub const MAX: u16 = 1000;

    /// Creates a new color temperature value.
    #[must_use]
    pub const fn new(mireds: u16) -> Self {
        Self(mireds)
    }

    /// Returns the value in mireds.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns `true` if the value lies in the configurable range.
    #[must_use]
    pub const fn is_in_range(&self) -> bool {
        self.0 >= Self::MIN && self.0 <= Self::MAX
    }
}

impl fmt::Display for ColorTemp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mired", self.0)
    }
}

impl From<u16> for ColorTemp {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
