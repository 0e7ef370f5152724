// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External commands.
//!
//! Commands are JSON objects published on the command topic, for example:
//!
//! ```json
//! {"action": "set_scene", "scene": "Warm", "transition": 2, "lights": ["light.kitchen"]}
//! ```
//!
//! A command addresses lights by `light` (one name, or `"all"`) or by
//! `lights` (a list). Both the light name and its zigbee2mqtt name match.

use serde::Deserialize;

use crate::controller::Action;
use crate::error::{ParseError, SceneError};
use crate::scene::Scene;

/// Name addressing every light.
pub const ALL_LIGHTS: &str = "all";

/// A command received on the external command channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalCommand {
    /// Action verb.
    pub action: String,
    /// Transition in seconds. Missing or `null` means instant.
    #[serde(default)]
    pub transition: Option<f64>,
    /// Scene name, for `set_scene`.
    #[serde(default)]
    pub scene: Option<String>,
    /// Single target.
    #[serde(default)]
    pub light: Option<String>,
    /// Several targets.
    #[serde(default)]
    pub lights: Vec<String>,
}

impl ExternalCommand {
    /// Parses a command payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if the payload is not a command object.
    pub fn from_slice(payload: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Returns `true` if the command addresses a light known by any of
    /// `names`. `"all"` always matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenectl::router::ExternalCommand;
    ///
    /// let cmd = ExternalCommand::from_slice(br#"{"action":"toggle","lights":["hall","desk"]}"#).unwrap();
    /// assert!(cmd.targets(&["light.desk", "desk"]));
    /// assert!(!cmd.targets(&["light.porch", "porch"]));
    /// ```
    #[must_use]
    pub fn targets(&self, names: &[&str]) -> bool {
        let matches = |candidate: &str| candidate == ALL_LIGHTS || names.contains(&candidate);
        self.light.as_deref().is_some_and(matches) || self.lights.iter().any(|l| matches(l))
    }

    /// Returns the transition in seconds, never negative.
    #[must_use]
    pub fn transition_seconds(&self) -> f64 {
        self.transition.unwrap_or_default().max(0.0)
    }

    /// Parses the action verb.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidAction`] for unknown verbs.
    pub fn action(&self) -> Result<Action, SceneError> {
        self.action.parse()
    }

    /// Parses the scene name, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidScene`] for unknown scene names.
    pub fn scene(&self) -> Result<Option<Scene>, SceneError> {
        self.scene.as_deref().map(str::parse).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_command() {
        let cmd = ExternalCommand::from_slice(
            br#"{"action":"set_scene","scene":"Warm","transition":3,"light":"light.kitchen"}"#,
        )
        .unwrap();
        assert_eq!(cmd.action().unwrap(), Action::SetScene);
        assert_eq!(cmd.scene().unwrap(), Some(Scene::Warm));
        assert!((cmd.transition_seconds() - 3.0).abs() < f64::EPSILON);
        assert!(cmd.targets(&["light.kitchen", "kitchen_light"]));
    }

    #[test]
    fn defaults_when_fields_missing() {
        let cmd = ExternalCommand::from_slice(br#"{"action":"toggle"}"#).unwrap();
        assert!(cmd.transition_seconds().abs() < f64::EPSILON);
        assert_eq!(cmd.scene().unwrap(), None);
        assert!(!cmd.targets(&["light.kitchen"]));
    }

    #[test]
    fn fractional_and_odd_transitions() {
        let cmd = ExternalCommand::from_slice(br#"{"action":"turn_on","transition":0.5}"#).unwrap();
        assert!((cmd.transition_seconds() - 0.5).abs() < f64::EPSILON);
        let cmd = ExternalCommand::from_slice(br#"{"action":"turn_on","transition":null}"#).unwrap();
        assert_eq!(cmd.transition, None);
        let cmd = ExternalCommand::from_slice(br#"{"action":"turn_on","transition":-2}"#).unwrap();
        assert!(cmd.transition_seconds().abs() < f64::EPSILON);
    }

    #[test]
    fn all_targets_every_light() {
        let single = ExternalCommand::from_slice(br#"{"action":"turn_off","light":"all"}"#).unwrap();
        assert!(single.targets(&["anything"]));
        let list = ExternalCommand::from_slice(br#"{"action":"turn_off","lights":["all"]}"#).unwrap();
        assert!(list.targets(&["anything"]));
    }

    #[test]
    fn targets_by_mqtt_name() {
        let cmd =
            ExternalCommand::from_slice(br#"{"action":"turn_on","light":"kitchen_light"}"#).unwrap();
        assert!(cmd.targets(&["light.kitchen", "kitchen_light"]));
    }

    #[test]
    fn invalid_action_and_scene() {
        let cmd = ExternalCommand::from_slice(br#"{"action":"dance","scene":"Party"}"#).unwrap();
        assert_eq!(cmd.action().unwrap_err(), SceneError::InvalidAction("dance".to_string()));
        assert_eq!(cmd.scene().unwrap_err(), SceneError::InvalidScene("Party".to_string()));
    }

    #[test]
    fn missing_action_is_malformed() {
        assert!(ExternalCommand::from_slice(br#"{"light":"all"}"#).is_err());
        assert!(ExternalCommand::from_slice(b"turn_on").is_err());
    }
}
