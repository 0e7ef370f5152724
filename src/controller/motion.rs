// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Motion timeout.
//!
//! With no occupancy, a lit light first waits `motion_timeout`
//! ([`TimerMode::DimPending`]), then dims to the motion-dimmed brightness
//! and waits `power_off_cancel_timeout` ([`TimerMode::OffPending`]) before
//! turning off. Occupancy, or the light being changed or switched off by
//! someone else, cancels the pending timer.
//!
//! The controller holds at most one timer. Arming always cancels the
//! previous one, and a fire carrying any other id is ignored.

use std::time::Instant;

use super::SceneController;
use crate::device::LightDevice;
use crate::error::Result;
use crate::scene::Scene;
use crate::scheduler::{Scheduler, TimerId};

/// What happens when the pending timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerMode {
    /// The light will dim.
    DimPending,
    /// The light is dimmed and will turn off.
    OffPending,
}

/// The single outstanding motion timer of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    /// Scheduler id of the timer.
    pub id: TimerId,
    /// Action taken on fire.
    pub mode: TimerMode,
    /// When the timer is due.
    pub fires_at: Instant,
    /// When the timer was armed. For an off timer this is when the light
    /// was dimmed.
    pub started_at: Instant,
}

impl<D: LightDevice, S: Scheduler> SceneController<D, S> {
    /// Returns the mode of the pending timer.
    #[must_use]
    pub fn timer_mode(&self) -> Option<TimerMode> {
        self.pending_timer.map(|t| t.mode)
    }

    pub(super) fn is_motion_dimmed(&self) -> bool {
        self.timer_mode() == Some(TimerMode::OffPending)
    }

    /// Handles a fired timer.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the dim or off command.
    pub fn on_timer(&mut self, id: TimerId) -> Result<()> {
        let Some(timer) = self.pending_timer.filter(|t| t.id == id) else {
            tracing::debug!(light = %self.settings.name, timer = %id, "Stale timer fire ignored");
            return Ok(());
        };
        match timer.mode {
            TimerMode::DimPending => {
                tracing::info!(light = %self.settings.name, "No motion, dimming light");
                self.pending_timer = None;
                self.dim_for_motion_timeout()
            }
            TimerMode::OffPending => {
                tracing::info!(light = %self.settings.name, "Still no motion, turning light off");
                self.pending_timer = None;
                self.select_scene(Scene::Off, 0.0, false)?;
                // the light has not reported yet
                self.current_state = Scene::Off;
                Ok(())
            }
        }
    }

    /// Brings the pending timer in line with the current state and
    /// occupancy. Does nothing for lights without motion sensors.
    pub(super) fn reconcile_motion_timer(&mut self) -> Result<()> {
        if self.motion_sensors.is_empty() {
            return Ok(());
        }
        let any_occupied = self.motion_sensors.values().any(|s| s.occupied);

        if self.pending_timer.is_some() && (self.current_state == Scene::Off || any_occupied) {
            self.cancel_motion_timer("light off or motion detected");
        }

        if let Some(timer) = self.pending_timer
            && timer.mode == TimerMode::OffPending
            && self.current_state != Scene::MotionDimmed
        {
            let elapsed = self.scheduler.now().saturating_duration_since(timer.started_at);
            // Undefined is expected while the dim transition runs
            if self.current_state != Scene::Undefined
                || elapsed > self.settings.timings.dim_grace_period()
            {
                self.cancel_motion_timer("light changed while dimmed");
            }
        }

        if self.pending_timer.is_none() && self.current_state != Scene::Off && !any_occupied {
            let timeout = self.settings.timings.motion_timeout;
            if timeout.is_zero() {
                tracing::debug!(light = %self.settings.name, "Zero motion timeout, dimming now");
                self.dim_for_motion_timeout()?;
            } else {
                self.arm_timer(TimerMode::DimPending, timeout);
            }
        }
        Ok(())
    }

    fn dim_for_motion_timeout(&mut self) -> Result<()> {
        let transition = f64::from(self.settings.timings.power_off_transition);
        self.select_scene(Scene::MotionDimmed, transition, false)?;
        // set now; the light reports the dimmed brightness only after the transition
        self.current_state = Scene::MotionDimmed;
        self.arm_timer(
            TimerMode::OffPending,
            self.settings.timings.power_off_cancel_timeout,
        );
        Ok(())
    }

    fn arm_timer(&mut self, mode: TimerMode, delay: std::time::Duration) {
        if let Some(previous) = self.pending_timer.take() {
            self.scheduler.cancel(previous.id);
        }
        let started_at = self.scheduler.now();
        let id = self.scheduler.run_once_after(delay);
        self.pending_timer = Some(PendingTimer {
            id,
            mode,
            fires_at: started_at + delay,
            started_at,
        });
        tracing::debug!(
            light = %self.settings.name,
            timer = %id,
            mode = ?mode,
            delay_secs = delay.as_secs_f64(),
            "Timer started"
        );
    }

    fn cancel_motion_timer(&mut self, reason: &str) {
        if let Some(timer) = self.pending_timer.take() {
            self.scheduler.cancel(timer.id);
            tracing::debug!(light = %self.settings.name, timer = %timer.id, reason, "Timer stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::controller::{ControllerSettings, MotionSensorSettings};
    use crate::device::{LightAttributes, LightCommand};
    use crate::testing::{ManualScheduler, SimulatedLight};

    fn controller(
        timeout: Duration,
    ) -> (
        SceneController<SimulatedLight, ManualScheduler>,
        SimulatedLight,
        ManualScheduler,
    ) {
        let mut settings = ControllerSettings::new("light.test");
        settings.timings.motion_timeout = timeout;
        settings.motion_sensors.push(MotionSensorSettings::new("motion"));
        let light = SimulatedLight::new(LightAttributes::on(255, Some(250)));
        let scheduler = ManualScheduler::new();
        let mut c = SceneController::new(settings, light.clone(), scheduler.clone());
        c.start().unwrap();
        (c, light, scheduler)
    }

    #[test]
    fn lit_light_arms_dim_timer_at_start() {
        let (c, light, _) = controller(Duration::from_secs(60));
        let timer = c.pending_timer().unwrap();
        assert_eq!(timer.mode, TimerMode::DimPending);
        assert_eq!(timer.fires_at - timer.started_at, Duration::from_secs(60));
        assert!(light.commands().is_empty());
    }

    #[test]
    fn reconcile_keeps_timer_identity() {
        let (mut c, _, _) = controller(Duration::from_secs(60));
        let first = c.pending_timer().unwrap().id;
        c.reconcile_motion_timer().unwrap();
        c.reconcile_motion_timer().unwrap();
        assert_eq!(c.pending_timer().unwrap().id, first);
    }

    #[test]
    fn stale_fire_is_ignored() {
        let (mut c, light, _) = controller(Duration::from_secs(60));
        let live = c.pending_timer().unwrap().id;
        c.on_timer(TimerId::next()).unwrap();
        assert_eq!(c.pending_timer().unwrap().id, live);
        assert!(light.commands().is_empty());
    }

    #[test]
    fn undefined_within_grace_keeps_off_timer() {
        let (mut c, light, scheduler) = controller(Duration::ZERO);
        assert_eq!(c.timer_mode(), Some(TimerMode::OffPending));
        let off_timer = c.pending_timer().unwrap().id;

        // mid-transition report
        light.set_attributes(LightAttributes::on(120, Some(250)));
        scheduler.advance(Duration::from_secs(3));
        c.on_light_changed().unwrap();
        assert_eq!(c.current_state(), Scene::Undefined);
        assert_eq!(c.pending_timer().unwrap().id, off_timer);

        // still undefined after the grace period: someone changed the light
        scheduler.advance(Duration::from_millis(4500));
        c.on_light_changed().unwrap();
        assert_ne!(c.pending_timer().map(|t| t.id), Some(off_timer));
        assert_eq!(c.timer_mode(), Some(TimerMode::OffPending));
        assert!(scheduler.cancelled().contains(&off_timer));
    }

    #[test]
    fn grace_boundary_is_inclusive() {
        let (mut c, light, scheduler) = controller(Duration::from_secs(30));
        for id in scheduler.advance(Duration::from_secs(30)) {
            c.on_timer(id).unwrap();
        }
        let off_timer = c.pending_timer().unwrap().id;
        light.set_attributes(LightAttributes::on(120, Some(250)));
        scheduler.advance(Duration::from_secs(7));
        c.on_light_changed().unwrap();
        assert_eq!(c.pending_timer().unwrap().id, off_timer);
    }

    #[test]
    fn off_timer_turns_light_off() {
        let (mut c, light, scheduler) = controller(Duration::ZERO);
        light.take_commands();
        for id in scheduler.advance(Duration::from_secs(8)) {
            c.on_timer(id).unwrap();
        }
        assert_eq!(c.current_state(), Scene::Off);
        assert!(c.pending_timer().is_none());
        assert_eq!(light.commands(), vec![LightCommand::Off { transition: 0.0 }]);
    }
}
