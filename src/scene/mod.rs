// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Symbolic light scenes.
//!
//! A [`Scene`] is what the controller believes the light is showing. Three
//! scenes (`Cold`, `Warm`, `Dimm`) have fixed targets in the
//! [`SceneCatalog`]; the others are derived from device state or from the
//! motion timeout.

mod catalog;

use std::fmt;
use std::str::FromStr;

pub use catalog::{SceneCatalog, SceneSettings};

use crate::error::SceneError;

/// Symbolic state of a controlled light.
///
/// # Examples
///
/// ```
/// use scenectl::Scene;
///
/// let scene: Scene = "warm".parse().unwrap();
/// assert_eq!(scene, Scene::Warm);
/// assert!("party".parse::<Scene>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scene {
    /// Light is off.
    Off,
    /// Light is on but reports no brightness.
    On,
    /// Cool white at full brightness.
    Cold,
    /// Warm white at full brightness.
    Warm,
    /// Warm white at reduced brightness.
    Dimm,
    /// Dimmed by the motion timeout, about to turn off.
    MotionDimmed,
    /// Light is on with attributes matching no known scene.
    #[default]
    Undefined,
}

impl Scene {
    /// Scenes with fixed targets, in detection order.
    pub const CATALOGED: [Self; 3] = [Self::Cold, Self::Warm, Self::Dimm];

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::On => "On",
            Self::Cold => "Cold",
            Self::Warm => "Warm",
            Self::Dimm => "Dimm",
            Self::MotionDimmed => "MotionDimmed",
            Self::Undefined => "Undefined",
        }
    }

    /// Returns the short label published as light status.
    ///
    /// `Undefined` is shown as `On`: the light is lit, just not in a
    /// recognized scene.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::On | Self::Undefined => "On",
            Self::Cold => "Cold",
            Self::Warm => "Warm",
            Self::Dimm => "Dimm",
            Self::MotionDimmed => "MotD",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scene {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            "cold" => Ok(Self::Cold),
            "warm" => Ok(Self::Warm),
            "dimm" => Ok(Self::Dimm),
            "motiondimmed" | "motion_dimmed" | "motd" => Ok(Self::MotionDimmed),
            "undefined" => Ok(Self::Undefined),
            _ => Err(SceneError::InvalidScene(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_from_str_case_insensitive() {
        assert_eq!("Cold".parse::<Scene>().unwrap(), Scene::Cold);
        assert_eq!("DIMM".parse::<Scene>().unwrap(), Scene::Dimm);
        assert_eq!("motion_dimmed".parse::<Scene>().unwrap(), Scene::MotionDimmed);
    }

    #[test]
    fn scene_from_str_unknown() {
        let err = "Disco".parse::<Scene>().unwrap_err();
        assert_eq!(err, SceneError::InvalidScene("Disco".to_string()));
    }

    #[test]
    fn status_labels() {
        assert_eq!(Scene::MotionDimmed.status_label(), "MotD");
        assert_eq!(Scene::Undefined.status_label(), "On");
        assert_eq!(Scene::Warm.status_label(), "Warm");
    }
}
