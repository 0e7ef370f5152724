// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-light controller settings.

use std::time::Duration;

use chrono::NaiveTime;

use crate::scene::SceneCatalog;
use crate::types::TimeWindow;

/// A motion sensor attached to a light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionSensorSettings {
    /// Sensor identifier, matching the id carried by motion events.
    pub name: String,
    /// Whether occupancy on this sensor may turn the light on.
    pub turn_on: bool,
}

impl MotionSensorSettings {
    /// Creates settings for a sensor that turns the light on.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            turn_on: true,
        }
    }
}

/// Durations driving the motion timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTimings {
    /// Time without occupancy before the light dims. Zero dims immediately.
    pub motion_timeout: Duration,
    /// Time spent dimmed before the light turns off.
    pub power_off_cancel_timeout: Duration,
    /// Transition of the dim command, in seconds.
    pub power_off_transition: u32,
    /// Motion after a manual switch-off is ignored for this long.
    pub ignore_motion_after_turn_off: Duration,
}

impl Default for MotionTimings {
    fn default() -> Self {
        Self {
            motion_timeout: Duration::from_secs(300),
            power_off_cancel_timeout: Duration::from_secs(8),
            power_off_transition: 5,
            ignore_motion_after_turn_off: Duration::from_secs(5),
        }
    }
}

impl MotionTimings {
    /// Extra time allowed after the dim transition before an unrecognized
    /// state cancels the off timer.
    pub const TRANSITION_GRACE: Duration = Duration::from_secs(2);

    /// Returns how long after the dim command an `Undefined` state is still
    /// attributed to the dim transition.
    #[must_use]
    pub fn dim_grace_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.power_off_transition)) + Self::TRANSITION_GRACE
    }
}

/// Everything a [`SceneController`](super::SceneController) needs to know
/// about its light.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Light name, used in logs and to match external commands.
    pub name: String,
    /// Scene targets.
    pub catalog: SceneCatalog,
    /// Minimum spacing between ordinary commands.
    pub debounce: Duration,
    /// Window in which the cold scene is the default. `None` means always.
    pub cold_window: Option<TimeWindow>,
    /// Window in which the warm scene is the default outside the cold
    /// window. `None` means always.
    pub warm_window: Option<TimeWindow>,
    /// Treat the cold window as closed while the sun is below the horizon.
    pub cold_requires_daylight: bool,
    /// Move a lit light between cold and warm when the default changes.
    pub auto_color_temp_change: bool,
    /// Motion timeout durations.
    pub timings: MotionTimings,
    /// Attached motion sensors.
    pub motion_sensors: Vec<MotionSensorSettings>,
    /// Attached door or window contacts.
    pub contacts: Vec<String>,
}

impl ControllerSettings {
    /// Default debounce window.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

    /// Creates settings with defaults for a light.
    ///
    /// The cold window defaults to 06:50:00-19:00:00 and there is no warm
    /// window, so evenings default to warm.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: SceneCatalog::default(),
            debounce: Self::DEFAULT_DEBOUNCE,
            cold_window: Some(DEFAULT_COLD_WINDOW),
            warm_window: None,
            cold_requires_daylight: false,
            auto_color_temp_change: true,
            timings: MotionTimings::default(),
            motion_sensors: Vec::new(),
            contacts: Vec::new(),
        }
    }
}

/// Default cold window, 06:50:00-19:00:00.
pub const DEFAULT_COLD_WINDOW: TimeWindow = TimeWindow::new(
    match NaiveTime::from_hms_opt(6, 50, 0) {
        Some(t) => t,
        None => panic!("invalid default window start"),
    },
    match NaiveTime::from_hms_opt(19, 0, 0) {
        Some(t) => t,
        None => panic!("invalid default window end"),
    },
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timings() {
        let t = MotionTimings::default();
        assert_eq!(t.motion_timeout, Duration::from_secs(300));
        assert_eq!(t.power_off_cancel_timeout, Duration::from_secs(8));
        assert_eq!(t.power_off_transition, 5);
        assert_eq!(t.dim_grace_period(), Duration::from_secs(7));
    }

    #[test]
    fn default_settings() {
        let s = ControllerSettings::new("light.hall");
        assert_eq!(s.name, "light.hall");
        assert_eq!(s.debounce, Duration::from_secs(1));
        assert_eq!(s.cold_window.unwrap().to_string(), "06:50:00-19:00:00");
        assert!(s.warm_window.is_none());
        assert!(s.auto_color_temp_change);
        assert!(s.motion_sensors.is_empty());
    }
}
