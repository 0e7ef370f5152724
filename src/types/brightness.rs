// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for light control.
//!
//! zigbee2mqtt reports brightness on a raw 0-255 scale. Devices round the
//! value they were asked for, so comparisons against scene targets use a
//! tolerance of one step instead of strict equality.

use std::fmt;

/// Raw brightness level (0-255).
///
/// # Examples
///
/// ```
/// use scenectl::types::Brightness;
///
/// let target = Brightness::new(76);
/// assert!(target.matches(Brightness::new(77)));
/// assert!(target.matches(Brightness::new(75)));
/// assert!(!target.matches(Brightness::new(78)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Brightness(u8);

impl Brightness {
    /// Zero brightness. Lights reporting this are treated as off.
    pub const MIN: Self = Self(0);

    /// Full brightness.
    pub const MAX: Self = Self(255);

    /// Allowed difference when matching a reported level against a target.
    pub const TOLERANCE: u8 = 1;

    /// Creates a new brightness value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw brightness value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` if the level is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `other` is within [`Self::TOLERANCE`] of this level.
    #[must_use]
    pub const fn matches(&self, other: Self) -> bool {
        self.0.abs_diff(other.0) <= Self::TOLERANCE
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_matches_within_tolerance() {
        let target = Brightness::new(255);
        assert!(target.matches(Brightness::new(255)));
        assert!(target.matches(Brightness::new(254)));
        assert!(!target.matches(Brightness::new(253)));
    }

    #[test]
    fn brightness_matches_at_lower_bound() {
        assert!(Brightness::MIN.matches(Brightness::new(1)));
        assert!(!Brightness::MIN.matches(Brightness::new(2)));
    }

    #[test]
    fn brightness_is_zero() {
        assert!(Brightness::MIN.is_zero());
        assert!(!Brightness::new(8).is_zero());
    }

    #[test]
    fn brightness_deserializes_from_number() {
        let b: Brightness = serde_json::from_str("128").unwrap();
        assert_eq!(b.value(), 128);
        assert!(serde_json::from_str::<Brightness>("300").is_err());
    }
}
