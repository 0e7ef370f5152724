// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light attributes and commands in zigbee2mqtt form.

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::{Brightness, ColorTemp, PowerState};

/// Attributes reported by a light.
///
/// Deserializes from a zigbee2mqtt state message. Unknown fields such as
/// `linkquality` are ignored.
///
/// # Examples
///
/// ```
/// use scenectl::device::LightAttributes;
/// use scenectl::types::PowerState;
///
/// let attrs = LightAttributes::from_json(
///     r#"{"state":"ON","brightness":254,"color_temp":250,"linkquality":87}"#,
/// ).unwrap();
/// assert_eq!(attrs.power, PowerState::On);
/// assert_eq!(attrs.brightness.map(|b| b.value()), Some(254));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LightAttributes {
    /// Power state.
    #[serde(rename = "state", default)]
    pub power: PowerState,

    /// Brightness, if reported.
    #[serde(default)]
    pub brightness: Option<Brightness>,

    /// Color temperature, if reported.
    #[serde(default)]
    pub color_temp: Option<ColorTemp>,
}

impl LightAttributes {
    /// Attributes of a light that is off.
    pub const OFF: Self = Self {
        power: PowerState::Off,
        brightness: None,
        color_temp: None,
    };

    /// Parses a zigbee2mqtt state message.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if the payload is not a JSON object with
    /// fields of the expected types.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns attributes of a light that is on.
    #[must_use]
    pub fn on(brightness: u8, color_temp: Option<u16>) -> Self {
        Self {
            power: PowerState::On,
            brightness: Some(Brightness::new(brightness)),
            color_temp: color_temp.map(ColorTemp::new),
        }
    }

    /// Merges a partial state update into these attributes.
    ///
    /// zigbee2mqtt may publish only the fields that changed, so absent fields
    /// keep their previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if a present field has the wrong type. The
    /// attributes may be partially updated in that case.
    pub fn merge(&mut self, update: &serde_json::Value) -> Result<(), ParseError> {
        if let Some(state) = update.get("state").and_then(serde_json::Value::as_str) {
            self.power = state.parse()?;
        }
        if let Some(value) = update.get("brightness") {
            self.brightness = serde_json::from_value(value.clone())?;
        }
        if let Some(value) = update.get("color_temp") {
            self.color_temp = serde_json::from_value(value.clone())?;
        }
        Ok(())
    }
}

/// A command for a light.
///
/// # Examples
///
/// ```
/// use scenectl::device::LightCommand;
/// use scenectl::types::Brightness;
///
/// let cmd = LightCommand::On {
///     brightness: Some(Brightness::new(8)),
///     color_temp: None,
///     transition: 0.5,
/// };
/// assert_eq!(
///     cmd.to_payload(),
///     serde_json::json!({"state": "ON", "brightness": 8, "transition": 0.5})
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightCommand {
    /// Power the light off.
    Off {
        /// Transition time in seconds.
        transition: f64,
    },
    /// Power the light on, optionally with target attributes.
    On {
        /// Target brightness.
        brightness: Option<Brightness>,
        /// Target color temperature.
        color_temp: Option<ColorTemp>,
        /// Transition time in seconds.
        transition: f64,
    },
}

impl LightCommand {
    /// Returns the transition time in seconds.
    #[must_use]
    pub const fn transition(&self) -> f64 {
        match self {
            Self::Off { transition } | Self::On { transition, .. } => *transition,
        }
    }

    /// Returns the power state this command sets.
    #[must_use]
    pub const fn power(&self) -> PowerState {
        match self {
            Self::Off { .. } => PowerState::Off,
            Self::On { .. } => PowerState::On,
        }
    }

    /// Builds the zigbee2mqtt `set` payload.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "state": self.power().as_str(),
            "transition": self.transition(),
        });
        if let Self::On {
            brightness,
            color_temp,
            ..
        } = self
        {
            if let Some(brightness) = brightness {
                payload["brightness"] = serde_json::json!(brightness.value());
            }
            if let Some(color_temp) = color_temp {
                payload["color_temp"] = serde_json::json!(color_temp.value());
            }
        }
        payload
    }
}
