// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Default scene selection.

use chrono::NaiveTime;

use super::{ControllerSettings, SceneController};
use crate::device::LightDevice;
use crate::error::Result;
use crate::scene::Scene;
use crate::scheduler::{Scheduler, SunPosition};
use crate::types::TimeWindow;

/// Transition used when moving a lit light to a new default scene.
const MIGRATION_TRANSITION_SECS: f64 = 30.0;

/// Chooses the default scene for a time of day.
///
/// Cold inside the cold window, warm inside the warm window, dimmed
/// otherwise. A missing window counts as always open. With
/// `cold_requires_daylight`, the cold window is closed while the sun is
/// known to be below the horizon.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use scenectl::controller::{ControllerSettings, choose_default_scene};
/// use scenectl::Scene;
///
/// let settings = ControllerSettings::new("light.desk");
/// let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
/// let night = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
/// assert_eq!(choose_default_scene(&settings, noon, None), Scene::Cold);
/// assert_eq!(choose_default_scene(&settings, night, None), Scene::Warm);
/// ```
#[must_use]
pub fn choose_default_scene(
    settings: &ControllerSettings,
    time: NaiveTime,
    sun: Option<SunPosition>,
) -> Scene {
    select_default(settings, sun, |window| window.contains(time))
}

fn select_default(
    settings: &ControllerSettings,
    sun: Option<SunPosition>,
    is_open: impl Fn(&TimeWindow) -> bool,
) -> Scene {
    let dark = settings.cold_requires_daylight && sun == Some(SunPosition::BelowHorizon);
    let cold = settings.cold_window.as_ref().is_none_or(&is_open);
    if cold && !dark {
        return Scene::Cold;
    }
    if settings.warm_window.as_ref().is_none_or(&is_open) {
        return Scene::Warm;
    }
    Scene::Dimm
}

impl<D: LightDevice, S: Scheduler> SceneController<D, S> {
    /// Recomputes the default scene.
    ///
    /// With automatic color temperature change enabled, a light showing cold
    /// while warm is the default (or the reverse) is moved over slowly. The
    /// dimmed scene is never entered or left this way.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the migration command.
    pub fn recompute_default_scene(&mut self) -> Result<()> {
        let scene = select_default(&self.settings, self.sun, |window| {
            self.scheduler.now_is_between(window)
        });
        if scene != self.default_scene {
            tracing::info!(
                light = %self.settings.name,
                from = %self.default_scene,
                to = %scene,
                "Default scene changed"
            );
        }
        self.default_scene = scene;

        if self.settings.auto_color_temp_change {
            let migrate = match (self.current_state, scene) {
                (Scene::Cold, Scene::Warm) => Some(Scene::Warm),
                (Scene::Warm, Scene::Cold) => Some(Scene::Cold),
                _ => None,
            };
            if let Some(target) = migrate {
                self.select_scene(target, MIGRATION_TRANSITION_SECS, false)?;
            }
        }
        Ok(())
    }
}
