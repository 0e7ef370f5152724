// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State detection from reported light attributes.

use super::motion::TimerMode;
use crate::device::LightAttributes;
use crate::scene::{Scene, SceneCatalog};

/// Derives the symbolic state of a light.
///
/// `timer_mode` is the mode of the controller's pending motion timer, if
/// any. A light at the dimmed brightness is only recognized as
/// [`Scene::MotionDimmed`] while the off timer runs; otherwise the same
/// attributes fall through to the catalog.
///
/// # Examples
///
/// ```
/// use scenectl::controller::detect;
/// use scenectl::device::LightAttributes;
/// use scenectl::{Scene, SceneCatalog};
///
/// let catalog = SceneCatalog::default();
/// assert_eq!(detect(&LightAttributes::on(254, Some(250)), None, &catalog), Scene::Cold);
/// assert_eq!(detect(&LightAttributes::on(128, Some(250)), None, &catalog), Scene::Undefined);
/// ```
#[must_use]
pub fn detect(
    attributes: &LightAttributes,
    timer_mode: Option<TimerMode>,
    catalog: &SceneCatalog,
) -> Scene {
    if !attributes.power.is_on() {
        return Scene::Off;
    }
    let Some(brightness) = attributes.brightness else {
        return Scene::On;
    };
    if timer_mode == Some(TimerMode::OffPending) && catalog.dimmed_brightness().matches(brightness)
    {
        return Scene::MotionDimmed;
    }
    if brightness.is_zero() {
        return Scene::Off;
    }
    catalog
        .find(brightness, attributes.color_temp)
        .unwrap_or(Scene::Undefined)
}
