// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounced scene dispatch.

use super::SceneController;
use crate::device::{LightCommand, LightDevice};
use crate::error::{Result, SceneError};
use crate::scene::Scene;
use crate::scheduler::Scheduler;

/// Transitions at least this long are never debounced.
pub(super) const LONG_TRANSITION_SECS: f64 = 5.0;

/// Outcome of a scene request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The command was sent to the light.
    Sent,
    /// The command was dropped by the debounce window.
    Debounced,
}

impl<D: LightDevice, S: Scheduler> SceneController<D, S> {
    /// Sends a scene to the light.
    ///
    /// A request arriving within the debounce window of the previous command
    /// is dropped, unless `force` is set or the transition is at least five
    /// seconds long.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidScene`] for [`Scene::Undefined`], which
    /// has no attributes to send, or an error if the device rejects the
    /// command.
    pub fn select_scene(&mut self, scene: Scene, transition: f64, force: bool) -> Result<Dispatch> {
        let command = self.command_for(scene, transition)?;

        let now = self.scheduler.now();
        if !force
            && transition < LONG_TRANSITION_SECS
            && self
                .last_command_at
                .is_some_and(|at| now.saturating_duration_since(at) < self.settings.debounce)
        {
            tracing::debug!(light = %self.settings.name, scene = %scene, "Command debounced");
            return Ok(Dispatch::Debounced);
        }

        self.device.send(&command)?;
        self.last_command_at = Some(self.scheduler.now());
        tracing::info!(
            light = %self.settings.name,
            scene = %scene,
            transition,
            force,
            "Scene selected"
        );
        Ok(Dispatch::Sent)
    }

    fn command_for(&self, scene: Scene, transition: f64) -> Result<LightCommand> {
        let catalog = &self.settings.catalog;
        let command = match scene {
            Scene::Off => LightCommand::Off { transition },
            Scene::On => LightCommand::On {
                brightness: None,
                color_temp: None,
                transition,
            },
            // brightness only, the color temperature stays as it was
            Scene::MotionDimmed => LightCommand::On {
                brightness: Some(catalog.dimmed_brightness()),
                color_temp: None,
                transition,
            },
            Scene::Cold | Scene::Warm | Scene::Dimm => {
                let target = catalog
                    .settings(scene)
                    .ok_or_else(|| SceneError::InvalidScene(scene.to_string()))?;
                LightCommand::On {
                    brightness: Some(target.brightness),
                    color_temp: catalog.color_temp_support().then_some(target.color_temp),
                    transition,
                }
            }
            Scene::Undefined => return Err(SceneError::InvalidScene(scene.to_string()).into()),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::controller::ControllerSettings;
    use crate::device::LightAttributes;
    use crate::error::Error;
    use crate::testing::{ManualScheduler, SimulatedLight};
    use crate::types::{Brightness, ColorTemp};

    fn controller() -> (
        SceneController<SimulatedLight, ManualScheduler>,
        SimulatedLight,
        ManualScheduler,
    ) {
        let light = SimulatedLight::new(LightAttributes::OFF);
        let scheduler = ManualScheduler::new();
        let c = SceneController::new(
            ControllerSettings::new("light.test"),
            light.clone(),
            scheduler.clone(),
        );
        (c, light, scheduler)
    }

    #[test]
    fn repeated_requests_are_debounced() {
        let (mut c, light, scheduler) = controller();
        assert_eq!(c.select_scene(Scene::Warm, 0.0, false).unwrap(), Dispatch::Sent);
        scheduler.advance(Duration::from_millis(500));
        assert_eq!(c.select_scene(Scene::Cold, 0.0, false).unwrap(), Dispatch::Debounced);
        assert_eq!(light.commands().len(), 1);

        scheduler.advance(Duration::from_millis(500));
        assert_eq!(c.select_scene(Scene::Cold, 0.0, false).unwrap(), Dispatch::Sent);
        assert_eq!(light.commands().len(), 2);
    }

    #[test]
    fn force_and_long_transitions_bypass_debounce() {
        let (mut c, light, _) = controller();
        c.select_scene(Scene::Warm, 0.0, false).unwrap();
        assert_eq!(c.select_scene(Scene::Cold, 0.0, true).unwrap(), Dispatch::Sent);
        assert_eq!(c.select_scene(Scene::Warm, 5.0, false).unwrap(), Dispatch::Sent);
        assert_eq!(c.select_scene(Scene::Dimm, 4.9, false).unwrap(), Dispatch::Debounced);
        assert_eq!(light.commands().len(), 3);
    }

    #[test]
    fn scene_commands() {
        let (mut c, light, _) = controller();
        c.select_scene(Scene::Dimm, 0.0, true).unwrap();
        c.select_scene(Scene::MotionDimmed, 5.0, true).unwrap();
        c.select_scene(Scene::On, 0.5, true).unwrap();
        c.select_scene(Scene::Off, 2.0, true).unwrap();
        assert_eq!(
            light.commands(),
            vec![
                LightCommand::On {
                    brightness: Some(Brightness::new(76)),
                    color_temp: Some(ColorTemp::new(400)),
                    transition: 0.0,
                },
                LightCommand::On {
                    brightness: Some(Brightness::new(8)),
                    color_temp: None,
                    transition: 5.0,
                },
                LightCommand::On {
                    brightness: None,
                    color_temp: None,
                    transition: 0.5,
                },
                LightCommand::Off { transition: 2.0 },
            ]
        );
    }

    #[test]
    fn color_temp_omitted_without_support() {
        let light = SimulatedLight::new(LightAttributes::OFF);
        let mut settings = ControllerSettings::new("light.plain");
        settings.catalog = crate::scene::SceneCatalog::new(
            crate::scene::SceneCatalog::DEFAULT_COLD,
            crate::scene::SceneCatalog::DEFAULT_WARM,
            crate::scene::SceneCatalog::DEFAULT_DIMM,
            crate::scene::SceneCatalog::DEFAULT_DIMMED_BRIGHTNESS,
            false,
        );
        let mut c = SceneController::new(settings, light.clone(), ManualScheduler::new());
        c.select_scene(Scene::Warm, 0.0, false).unwrap();
        assert_eq!(
            light.commands(),
            vec![LightCommand::On {
                brightness: Some(Brightness::new(255)),
                color_temp: None,
                transition: 0.0,
            }]
        );
    }

    #[test]
    fn undefined_is_rejected() {
        let (mut c, light, _) = controller();
        let err = c.select_scene(Scene::Undefined, 0.0, true).unwrap_err();
        assert!(matches!(err, Error::Scene(SceneError::InvalidScene(_))));
        assert!(light.commands().is_empty());
    }
}
