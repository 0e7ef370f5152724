// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene controller for a single light.
//!
//! The controller does not trust its own idea of the light's state. The
//! light can be changed by anyone, so every attribute report is turned back
//! into a [`Scene`] by [`detect`], and only that derived value is kept.
//!
//! On top of the detected state the controller runs:
//!
//! - a default-scene selector fed by time windows and sun position,
//! - a debounced command dispatcher,
//! - the motion timeout, which dims an unattended light and then turns it
//!   off, using at most one pending timer.
//!
//! All methods take `&mut self` and are expected to be called from a single
//! event loop, one event at a time.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use scenectl::controller::{ControllerSettings, MotionSensorSettings, SceneController};
//! use scenectl::device::LightAttributes;
//! use scenectl::testing::{ManualScheduler, SimulatedLight};
//! use scenectl::Scene;
//!
//! # fn main() -> scenectl::Result<()> {
//! let mut settings = ControllerSettings::new("light.hall");
//! settings.cold_window = None;
//! settings.motion_sensors.push(MotionSensorSettings::new("hall_motion"));
//!
//! let light = SimulatedLight::new(LightAttributes::OFF);
//! let scheduler = ManualScheduler::new();
//! let mut controller = SceneController::new(settings, light.clone(), scheduler.clone());
//! controller.start()?;
//!
//! controller.on_motion("hall_motion", true)?;
//! controller.on_light_changed()?;
//! assert_eq!(controller.current_state(), Scene::Cold);
//! # Ok(())
//! # }
//! ```

mod actions;
mod default_scene;
mod detector;
mod dispatcher;
mod motion;
mod settings;

use std::collections::HashMap;
use std::time::Instant;

pub use actions::{Action, SwitchAction};
pub use default_scene::choose_default_scene;
pub use detector::detect;
pub use dispatcher::Dispatch;
pub use motion::{PendingTimer, TimerMode};
pub use settings::{ControllerSettings, DEFAULT_COLD_WINDOW, MotionSensorSettings, MotionTimings};

use crate::device::LightDevice;
use crate::error::Result;
use crate::scene::Scene;
use crate::scheduler::{ScheduleTrigger, Scheduler, SunPosition};

/// Last known state of a motion sensor.
#[derive(Debug, Clone, Copy)]
struct MotionSensor {
    occupied: bool,
    turn_on: bool,
}

/// Scene state machine for one light.
///
/// Generic over the light it drives and the scheduler providing time and
/// timers, so the same logic runs against MQTT in production and against
/// in-memory fakes in tests.
#[derive(Debug)]
pub struct SceneController<D, S> {
    settings: ControllerSettings,
    device: D,
    scheduler: S,
    current_state: Scene,
    default_scene: Scene,
    sun: Option<SunPosition>,
    pending_timer: Option<PendingTimer>,
    motion_sensors: HashMap<String, MotionSensor>,
    contacts: HashMap<String, bool>,
    last_command_at: Option<Instant>,
    last_manual_off_at: Option<Instant>,
    auto_on_enabled: bool,
}

impl<D: LightDevice, S: Scheduler> SceneController<D, S> {
    /// Creates a controller and detects the initial state from the device.
    ///
    /// Motion sensors start unoccupied and contacts start closed. Call
    /// [`start`](Self::start) before feeding events.
    pub fn new(settings: ControllerSettings, device: D, scheduler: S) -> Self {
        let motion_sensors = settings
            .motion_sensors
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    MotionSensor {
                        occupied: false,
                        turn_on: s.turn_on,
                    },
                )
            })
            .collect();
        let contacts = settings.contacts.iter().map(|c| (c.clone(), true)).collect();
        let current_state = detect(&device.read_attributes(), None, &settings.catalog);
        let default_scene = choose_default_scene(&settings, scheduler.time_of_day(), None);

        tracing::info!(
            light = %settings.name,
            state = %current_state,
            default_scene = %default_scene,
            "Controller created"
        );

        Self {
            settings,
            device,
            scheduler,
            current_state,
            default_scene,
            sun: None,
            pending_timer: None,
            motion_sensors,
            contacts,
            last_command_at: None,
            last_manual_off_at: None,
            auto_on_enabled: true,
        }
    }

    /// Publishes the initial status and starts the motion timeout if the
    /// light is already on.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects a command or status update.
    pub fn start(&mut self) -> Result<()> {
        self.publish_status()?;
        self.reconcile_motion_timer()
    }

    /// Returns the settings this controller was built with.
    #[must_use]
    pub const fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Returns the light name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Returns the last detected state.
    #[must_use]
    pub const fn current_state(&self) -> Scene {
        self.current_state
    }

    /// Returns the scene that turning the light on resolves to.
    #[must_use]
    pub const fn default_scene(&self) -> Scene {
        self.default_scene
    }

    /// Returns the pending motion timer, if any.
    #[must_use]
    pub const fn pending_timer(&self) -> Option<&PendingTimer> {
        self.pending_timer.as_ref()
    }

    /// Returns the last reported sun position.
    #[must_use]
    pub const fn sun_position(&self) -> Option<SunPosition> {
        self.sun
    }

    /// Returns whether motion may currently turn the light on.
    #[must_use]
    pub const fn auto_on_enabled(&self) -> bool {
        self.auto_on_enabled
    }

    /// Returns the device.
    #[must_use]
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// Returns the scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Handles a change of the light's reported attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects a command or status update.
    pub fn on_light_changed(&mut self) -> Result<()> {
        self.refresh_state();
        self.reconcile_motion_timer()?;
        self.publish_status()
    }

    /// Handles an occupancy report from a motion sensor.
    ///
    /// Repeated reports of the same value are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects a command.
    pub fn on_motion(&mut self, sensor: &str, occupied: bool) -> Result<()> {
        let Some(state) = self.motion_sensors.get_mut(sensor) else {
            tracing::debug!(light = %self.settings.name, sensor, "Unknown motion sensor");
            return Ok(());
        };
        if state.occupied == occupied {
            return Ok(());
        }
        state.occupied = occupied;
        let turn_on = state.turn_on;
        tracing::debug!(light = %self.settings.name, sensor, occupied, "Occupancy changed");

        if occupied && self.is_dark() {
            if self.within_manual_off_grace() {
                tracing::info!(
                    light = %self.settings.name,
                    sensor,
                    "Motion ignored shortly after manual switch-off"
                );
            } else if self.is_motion_dimmed() {
                tracing::info!(light = %self.settings.name, sensor, "Motion while dimmed, restoring light");
                self.select_scene(self.default_scene, 0.0, true)?;
            } else if turn_on && self.auto_on_enabled {
                tracing::info!(light = %self.settings.name, sensor, "Motion detected, turning light on");
                self.select_scene(self.default_scene, 1.0, false)?;
            }
        }
        self.reconcile_motion_timer()
    }

    /// Handles a door or window contact report. `closed` is `false` when
    /// the contact opens.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects a command.
    pub fn on_contact(&mut self, contact: &str, closed: bool) -> Result<()> {
        let Some(state) = self.contacts.get_mut(contact) else {
            tracing::debug!(light = %self.settings.name, contact, "Unknown contact");
            return Ok(());
        };
        if *state == closed {
            return Ok(());
        }
        *state = closed;
        tracing::debug!(light = %self.settings.name, contact, closed, "Contact changed");

        if !closed && self.is_dark() {
            tracing::info!(light = %self.settings.name, contact, "Contact opened, turning light on");
            self.select_scene(self.default_scene, 0.0, false)?;
        }
        Ok(())
    }

    /// Sets the gate allowing motion to turn the light on.
    pub fn set_auto_on_enabled(&mut self, enabled: bool) {
        if self.auto_on_enabled != enabled {
            tracing::debug!(light = %self.settings.name, enabled, "Motion auto-on gate changed");
        }
        self.auto_on_enabled = enabled;
    }

    /// Handles a daily window edge or a sun crossing.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects a migration command.
    pub fn on_schedule(&mut self, trigger: ScheduleTrigger) -> Result<()> {
        if let ScheduleTrigger::Sun(position) = trigger {
            tracing::debug!(light = %self.settings.name, sun = %position, "Sun position changed");
            self.sun = Some(position);
        }
        self.recompute_default_scene()
    }

    /// Re-derives `current_state` from the device, logging transitions.
    fn refresh_state(&mut self) {
        let detected = detect(
            &self.device.read_attributes(),
            self.timer_mode(),
            &self.settings.catalog,
        );
        if detected != self.current_state {
            tracing::info!(
                light = %self.settings.name,
                from = %self.current_state,
                to = %detected,
                "Light state changed"
            );
        }
        self.current_state = detected;
    }

    /// Off, or dimmed by the motion timeout.
    fn is_dark(&self) -> bool {
        self.current_state == Scene::Off || self.is_motion_dimmed()
    }

    fn within_manual_off_grace(&self) -> bool {
        self.last_manual_off_at.is_some_and(|at| {
            self.scheduler.now().saturating_duration_since(at)
                < self.settings.timings.ignore_motion_after_turn_off
        })
    }

    fn publish_status(&self) -> Result<()> {
        // Mid-transition reports just after a command are not worth showing.
        if self.current_state == Scene::Undefined
            && self.last_command_at.is_some_and(|at| {
                self.scheduler.now().saturating_duration_since(at) < STATUS_SETTLE_TIME
            })
        {
            return Ok(());
        }
        self.device
            .publish_status(self.current_state.status_label())
            .map_err(Into::into)
    }
}

const STATUS_SETTLE_TIME: std::time::Duration = std::time::Duration::from_secs(1);
