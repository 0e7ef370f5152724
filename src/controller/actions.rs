// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch and command actions.

use std::fmt;
use std::str::FromStr;

use super::SceneController;
use crate::device::LightDevice;
use crate::error::{Result, SceneError};
use crate::scene::Scene;
use crate::scheduler::Scheduler;

/// An action requested through the external command channel or a custom
/// telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Turn on to the default scene if off or motion-dimmed.
    TurnOn,
    /// Restore the default scene if motion-dimmed, ignoring debounce.
    TurnOnMotionDimmed,
    /// Turn on to the default scene unconditionally, ignoring debounce.
    ForceTurnOn,
    /// Turn off if on.
    TurnOff,
    /// Select a named scene.
    SetScene,
    /// Same as a single switch press.
    Toggle,
}

impl Action {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOnMotionDimmed => "turn_on_motion_dimmed",
            Self::ForceTurnOn => "force_turn_on",
            Self::TurnOff => "turn_off",
            Self::SetScene => "set_scene",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SceneError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "turn_on" => Ok(Self::TurnOn),
            "turn_on_motion_dimmed" => Ok(Self::TurnOnMotionDimmed),
            "force_turn_on" => Ok(Self::ForceTurnOn),
            "turn_off" => Ok(Self::TurnOff),
            "set_scene" => Ok(Self::SetScene),
            "toggle" => Ok(Self::Toggle),
            _ => Err(SceneError::InvalidAction(s.to_string())),
        }
    }
}

/// A switch button resolved through its vendor profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchAction {
    /// Off to the default scene, anything else to off.
    Toggle,
    /// Alternate between warm and cold.
    CycleTemperature,
    /// Dim, unless already dimmed.
    DimHold,
    /// Dim unconditionally.
    Dimm,
}

impl<D: LightDevice, S: Scheduler> SceneController<D, S> {
    /// Runs an external action.
    ///
    /// `scene` is only used by [`Action::SetScene`], which accepts `Off`,
    /// `Warm`, `Cold` and `Dimm`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidScene`] if `set_scene` names no scene or
    /// a scene that cannot be selected directly, or an error if the device
    /// rejects the command.
    pub fn process_action(
        &mut self,
        action: Action,
        transition: f64,
        scene: Option<Scene>,
    ) -> Result<()> {
        tracing::debug!(light = %self.settings.name, action = %action, transition, "Action received");
        match action {
            Action::TurnOn => {
                if self.is_dark() {
                    self.select_scene(self.default_scene, transition, false)?;
                }
            }
            Action::TurnOnMotionDimmed => {
                if self.is_motion_dimmed() {
                    self.select_scene(self.default_scene, transition, true)?;
                }
            }
            Action::ForceTurnOn => {
                self.select_scene(self.default_scene, transition, true)?;
            }
            Action::TurnOff => {
                if self.current_state != Scene::Off {
                    self.select_scene(Scene::Off, transition, false)?;
                }
            }
            Action::SetScene => match scene {
                Some(s @ (Scene::Off | Scene::Warm | Scene::Cold | Scene::Dimm)) => {
                    self.select_scene(s, transition, false)?;
                }
                Some(other) => return Err(SceneError::InvalidScene(other.to_string()).into()),
                None => return Err(SceneError::InvalidScene("none".to_string()).into()),
            },
            Action::Toggle => self.toggle_light()?,
        }
        Ok(())
    }

    /// Runs a switch action.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the command.
    pub fn on_switch(&mut self, action: SwitchAction) -> Result<()> {
        tracing::debug!(light = %self.settings.name, action = ?action, "Switch pressed");
        match action {
            SwitchAction::Toggle => self.toggle_light(),
            SwitchAction::CycleTemperature => self.cycle_temperature(),
            SwitchAction::DimHold => {
                if self.current_state != Scene::Dimm {
                    self.select_scene(Scene::Dimm, 0.0, false)?;
                }
                Ok(())
            }
            SwitchAction::Dimm => self.select_scene(Scene::Dimm, 0.0, false).map(|_| ()),
        }
    }

    /// Turns an off light on to the default scene, anything else off.
    ///
    /// Switching off this way suppresses motion-triggered turn-on for
    /// `ignore_motion_after_turn_off`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the command.
    pub fn toggle_light(&mut self) -> Result<()> {
        if self.current_state == Scene::Off {
            self.select_scene(self.default_scene, 0.0, false)?;
        } else {
            self.select_scene(Scene::Off, 0.0, false)?;
            self.last_manual_off_at = Some(self.scheduler.now());
        }
        Ok(())
    }

    /// Warm goes to cold; cold, dimmed and off go to warm; anything else
    /// goes to the default scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the command.
    pub fn cycle_temperature(&mut self) -> Result<()> {
        let target = match self.current_state {
            Scene::Warm => Scene::Cold,
            Scene::Cold | Scene::Off | Scene::Dimm => Scene::Warm,
            _ => self.default_scene,
        };
        self.select_scene(target, 0.0, false).map(|_| ())
    }
}
