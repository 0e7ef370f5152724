// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall switch profiles.
//!
//! Each supported switch family reports button presses as an `action`
//! string. A profile maps those strings to [`SwitchAction`]s once, at
//! configuration time, so unknown switch families fail at startup instead
//! of on the first press.

use crate::controller::SwitchAction;
use crate::error::ConfigError;

/// Button names of an Aqara-style switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AqaraButtons {
    /// Action reported for a single press.
    pub single: String,
    /// Action reported for a double press.
    pub double: String,
    /// Action reported for a long press.
    pub hold: String,
}

impl Default for AqaraButtons {
    fn default() -> Self {
        Self {
            single: "single".to_string(),
            double: "double".to_string(),
            hold: "hold".to_string(),
        }
    }
}

/// How a switch's actions map to controller actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchProfile {
    /// Aqara wireless switch with configurable action names.
    Aqara(AqaraButtons),
    /// Philips Hue dimmer switch.
    Philips,
    /// Philips Hue dimmer switch also bound directly to the light, which
    /// handles the on button by itself.
    PhilipsBind,
}

impl SwitchProfile {
    /// Resolves a configured switch type.
    ///
    /// `buttons` is only used by the `aqara` profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSwitchType`] for unknown types.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenectl::controller::SwitchAction;
    /// use scenectl::router::{AqaraButtons, SwitchProfile};
    ///
    /// let profile = SwitchProfile::from_type("philips", AqaraButtons::default()).unwrap();
    /// assert_eq!(profile.resolve("off_hold"), Some(SwitchAction::Dimm));
    /// assert!(SwitchProfile::from_type("ikea", AqaraButtons::default()).is_err());
    /// ```
    pub fn from_type(kind: &str, buttons: AqaraButtons) -> Result<Self, ConfigError> {
        match kind {
            "aqara" => Ok(Self::Aqara(buttons)),
            "philips" => Ok(Self::Philips),
            "philips_bind" => Ok(Self::PhilipsBind),
            other => Err(ConfigError::InvalidSwitchType(other.to_string())),
        }
    }

    /// Maps a reported action string. Returns `None` for actions the
    /// profile does not use, such as button release events.
    #[must_use]
    pub fn resolve(&self, action: &str) -> Option<SwitchAction> {
        match self {
            Self::Aqara(buttons) => {
                if action == buttons.single {
                    Some(SwitchAction::Toggle)
                } else if action == buttons.double {
                    Some(SwitchAction::CycleTemperature)
                } else if action == buttons.hold {
                    Some(SwitchAction::DimHold)
                } else {
                    None
                }
            }
            Self::Philips | Self::PhilipsBind => match action {
                "on_press_release" if matches!(self, Self::Philips) => Some(SwitchAction::Toggle),
                "on_hold" | "off_hold" => Some(SwitchAction::Dimm),
                "off_press_release" => Some(SwitchAction::CycleTemperature),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aqara_default_buttons() {
        let p = SwitchProfile::from_type("aqara", AqaraButtons::default()).unwrap();
        assert_eq!(p.resolve("single"), Some(SwitchAction::Toggle));
        assert_eq!(p.resolve("double"), Some(SwitchAction::CycleTemperature));
        assert_eq!(p.resolve("hold"), Some(SwitchAction::DimHold));
        assert_eq!(p.resolve("release"), None);
    }

    #[test]
    fn aqara_custom_buttons() {
        let buttons = AqaraButtons {
            single: "left".to_string(),
            double: "left_double".to_string(),
            hold: "left_long".to_string(),
        };
        let p = SwitchProfile::from_type("aqara", buttons).unwrap();
        assert_eq!(p.resolve("left"), Some(SwitchAction::Toggle));
        assert_eq!(p.resolve("left_long"), Some(SwitchAction::DimHold));
        assert_eq!(p.resolve("single"), None);
    }

    #[test]
    fn philips_profile() {
        let p = SwitchProfile::Philips;
        assert_eq!(p.resolve("on_press_release"), Some(SwitchAction::Toggle));
        assert_eq!(p.resolve("on_hold"), Some(SwitchAction::Dimm));
        assert_eq!(p.resolve("off_press_release"), Some(SwitchAction::CycleTemperature));
        assert_eq!(p.resolve("up_press_release"), None);
    }

    #[test]
    fn philips_bind_ignores_on_button() {
        let p = SwitchProfile::from_type("philips_bind", AqaraButtons::default()).unwrap();
        assert_eq!(p.resolve("on_press_release"), None);
        assert_eq!(p.resolve("off_hold"), Some(SwitchAction::Dimm));
    }

    #[test]
    fn unknown_switch_type() {
        let err = SwitchProfile::from_type("ikea", AqaraButtons::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSwitchType(ref t) if t == "ikea"));
    }
}
