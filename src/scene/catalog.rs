// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene catalog: fixed targets for the cataloged scenes.

use super::Scene;
use crate::types::{Brightness, ColorTemp};

/// Target attributes of a cataloged scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSettings {
    /// Target brightness.
    pub brightness: Brightness,
    /// Target color temperature.
    pub color_temp: ColorTemp,
}

impl SceneSettings {
    /// Creates scene settings from raw values.
    #[must_use]
    pub const fn new(brightness: u8, color_temp: u16) -> Self {
        Self {
            brightness: Brightness::new(brightness),
            color_temp: ColorTemp::new(color_temp),
        }
    }
}

/// Scene targets for one light.
///
/// Built once from configuration and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use scenectl::types::{Brightness, ColorTemp};
/// use scenectl::{Scene, SceneCatalog};
///
/// let catalog = SceneCatalog::default();
/// let found = catalog.find(Brightness::new(254), Some(ColorTemp::new(389)));
/// assert_eq!(found, Some(Scene::Warm));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCatalog {
    cold: SceneSettings,
    warm: SceneSettings,
    dimm: SceneSettings,
    dimmed_brightness: Brightness,
    color_temp_support: bool,
}

impl Default for SceneCatalog {
    fn default() -> Self {
        Self {
            cold: Self::DEFAULT_COLD,
            warm: Self::DEFAULT_WARM,
            dimm: Self::DEFAULT_DIMM,
            dimmed_brightness: Self::DEFAULT_DIMMED_BRIGHTNESS,
            color_temp_support: true,
        }
    }
}

impl SceneCatalog {
    /// Default cold scene: full brightness, 250 mired.
    pub const DEFAULT_COLD: SceneSettings = SceneSettings::new(255, 250);
    /// Default warm scene: full brightness, 389 mired.
    pub const DEFAULT_WARM: SceneSettings = SceneSettings::new(255, 389);
    /// Default dimmed scene: 30% brightness, 400 mired.
    pub const DEFAULT_DIMM: SceneSettings = SceneSettings::new(76, 400);
    /// Default brightness of the motion-dimmed state.
    pub const DEFAULT_DIMMED_BRIGHTNESS: Brightness = Brightness::new(8);

    /// Creates a catalog.
    #[must_use]
    pub const fn new(
        cold: SceneSettings,
        warm: SceneSettings,
        dimm: SceneSettings,
        dimmed_brightness: Brightness,
        color_temp_support: bool,
    ) -> Self {
        Self {
            cold,
            warm,
            dimm,
            dimmed_brightness,
            color_temp_support,
        }
    }

    /// Returns the targets of a cataloged scene, or `None` for scenes
    /// without fixed attributes.
    #[must_use]
    pub const fn settings(&self, scene: Scene) -> Option<&SceneSettings> {
        match scene {
            Scene::Cold => Some(&self.cold),
            Scene::Warm => Some(&self.warm),
            Scene::Dimm => Some(&self.dimm),
            _ => None,
        }
    }

    /// Returns the brightness used for the motion-dimmed state.
    #[must_use]
    pub const fn dimmed_brightness(&self) -> Brightness {
        self.dimmed_brightness
    }

    /// Returns `true` if the light accepts color temperature.
    #[must_use]
    pub const fn color_temp_support(&self) -> bool {
        self.color_temp_support
    }

    /// Finds the first cataloged scene matching reported attributes.
    ///
    /// Brightness matches within one step. Color temperature must match
    /// exactly when the light supports it and is ignored otherwise.
    #[must_use]
    pub fn find(&self, brightness: Brightness, color_temp: Option<ColorTemp>) -> Option<Scene> {
        Scene::CATALOGED.into_iter().find(|scene| {
            self.settings(*scene).is_some_and(|target| {
                target.brightness.matches(brightness)
                    && (!self.color_temp_support || color_temp == Some(target.color_temp))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets() {
        let catalog = SceneCatalog::default();
        assert_eq!(catalog.settings(Scene::Cold), Some(&SceneSettings::new(255, 250)));
        assert_eq!(catalog.settings(Scene::Warm), Some(&SceneSettings::new(255, 389)));
        assert_eq!(catalog.settings(Scene::Dimm), Some(&SceneSettings::new(76, 400)));
        assert_eq!(catalog.settings(Scene::Off), None);
        assert_eq!(catalog.dimmed_brightness().value(), 8);
    }

    #[test]
    fn find_requires_exact_color_temp() {
        let catalog = SceneCatalog::default();
        assert_eq!(
            catalog.find(Brightness::new(75), Some(ColorTemp::new(400))),
            Some(Scene::Dimm)
        );
        assert_eq!(catalog.find(Brightness::new(76), Some(ColorTemp::new(401))), None);
        assert_eq!(catalog.find(Brightness::new(76), None), None);
    }

    #[test]
    fn find_prefers_cold_on_brightness_only_lights() {
        let catalog = SceneCatalog::new(
            SceneCatalog::DEFAULT_COLD,
            SceneCatalog::DEFAULT_WARM,
            SceneCatalog::DEFAULT_DIMM,
            SceneCatalog::DEFAULT_DIMMED_BRIGHTNESS,
            false,
        );
        // cold and warm share a brightness; cold is checked first
        assert_eq!(catalog.find(Brightness::new(255), None), Some(Scene::Cold));
        assert_eq!(catalog.find(Brightness::new(77), Some(ColorTemp::new(153))), Some(Scene::Dimm));
        assert_eq!(catalog.find(Brightness::new(128), None), None);
    }
}
