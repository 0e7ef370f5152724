// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic fakes for exercising controllers without a broker.
//!
//! Available with the `testing-support` feature.
//!
//! - [`SimulatedLight`] records every command and, by default, applies it
//!   to its attributes the way a real light eventually would.
//! - [`ManualScheduler`] only moves when told to, and hands back the timers
//!   that became due so the caller can deliver them.
//!
//! Both are cheap handles over shared state, so a test keeps a clone while
//! the controller owns another.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveTime;
use parking_lot::Mutex;

use crate::device::{LightAttributes, LightCommand, LightDevice};
use crate::error::ProtocolError;
use crate::scheduler::{Scheduler, TimerId};
use crate::types::PowerState;

#[derive(Debug)]
struct LightState {
    attributes: LightAttributes,
    commands: Vec<LightCommand>,
    statuses: Vec<String>,
    auto_apply: bool,
}

/// In-memory light.
#[derive(Debug, Clone)]
pub struct SimulatedLight {
    inner: Arc<Mutex<LightState>>,
}

impl SimulatedLight {
    /// Creates a light reporting `attributes`.
    #[must_use]
    pub fn new(attributes: LightAttributes) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LightState {
                attributes,
                commands: Vec::new(),
                statuses: Vec::new(),
                auto_apply: true,
            })),
        }
    }

    /// Controls whether sent commands change the reported attributes.
    pub fn set_auto_apply(&self, enabled: bool) {
        self.inner.lock().auto_apply = enabled;
    }

    /// Replaces the reported attributes, as an external change would.
    pub fn set_attributes(&self, attributes: LightAttributes) {
        self.inner.lock().attributes = attributes;
    }

    /// Returns every command sent so far.
    #[must_use]
    pub fn commands(&self) -> Vec<LightCommand> {
        self.inner.lock().commands.clone()
    }

    /// Returns and clears the recorded commands.
    #[must_use]
    pub fn take_commands(&self) -> Vec<LightCommand> {
        std::mem::take(&mut self.inner.lock().commands)
    }

    /// Returns every published status label.
    #[must_use]
    pub fn statuses(&self) -> Vec<String> {
        self.inner.lock().statuses.clone()
    }
}

impl LightDevice for SimulatedLight {
    fn send(&self, command: &LightCommand) -> Result<(), ProtocolError> {
        let mut state = self.inner.lock();
        state.commands.push(*command);
        if state.auto_apply {
            match *command {
                LightCommand::Off { .. } => state.attributes.power = PowerState::Off,
                LightCommand::On {
                    brightness,
                    color_temp,
                    ..
                } => {
                    state.attributes.power = PowerState::On;
                    if brightness.is_some() {
                        state.attributes.brightness = brightness;
                    }
                    if color_temp.is_some() {
                        state.attributes.color_temp = color_temp;
                    }
                }
            }
        }
        Ok(())
    }

    fn read_attributes(&self) -> LightAttributes {
        self.inner.lock().attributes
    }

    fn publish_status(&self, label: &str) -> Result<(), ProtocolError> {
        self.inner.lock().statuses.push(label.to_string());
        Ok(())
    }
}

#[derive(Debug)]
struct SchedulerState {
    now: Instant,
    time_of_day: NaiveTime,
    timers: BTreeMap<TimerId, Instant>,
    cancelled: Vec<TimerId>,
}

/// Scheduler driven by hand.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    inner: Arc<Mutex<SchedulerState>>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    /// Creates a scheduler whose local time reads 12:00:00.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerState {
                now: Instant::now(),
                time_of_day: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
                timers: BTreeMap::new(),
                cancelled: Vec::new(),
            })),
        }
    }

    /// Sets the local time of day without moving the monotonic clock.
    pub fn set_time_of_day(&self, time: NaiveTime) {
        self.inner.lock().time_of_day = time;
    }

    /// Moves both clocks forward and returns the timers that became due,
    /// earliest first. Returned timers are no longer active.
    pub fn advance(&self, by: Duration) -> Vec<TimerId> {
        let mut state = self.inner.lock();
        state.now += by;
        if let Ok(delta) = chrono::Duration::from_std(by) {
            state.time_of_day = state.time_of_day.overflowing_add_signed(delta).0;
        }
        let now = state.now;
        let mut due: Vec<(Instant, TimerId)> = state
            .timers
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, at)| (*at, *id))
            .collect();
        due.sort();
        for (_, id) in &due {
            state.timers.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Returns the timers still waiting to fire.
    #[must_use]
    pub fn active_timers(&self) -> Vec<TimerId> {
        self.inner.lock().timers.keys().copied().collect()
    }

    /// Returns every timer cancelled so far.
    #[must_use]
    pub fn cancelled(&self) -> Vec<TimerId> {
        self.inner.lock().cancelled.clone()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.inner.lock().now
    }

    fn time_of_day(&self) -> NaiveTime {
        self.inner.lock().time_of_day
    }

    fn run_once_after(&mut self, delay: Duration) -> TimerId {
        let id = TimerId::next();
        let mut state = self.inner.lock();
        let at = state.now + delay;
        state.timers.insert(id, at);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let mut state = self.inner.lock();
        if state.timers.remove(&id).is_some() {
            state.cancelled.push(id);
        }
    }
}
