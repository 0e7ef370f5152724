// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event routing.
//!
//! Every input of a light, whatever its source, arrives as an
//! [`InboundEvent`] on that light's queue. The [`EventRouter`] owns the
//! light's [`SceneController`], interprets raw device payloads according to
//! the light's configuration, and calls the matching controller operation.
//!
//! Payloads without the field an input needs are dropped with a trace log.
//! Rejected requests (unknown action verbs or scene names) are returned as
//! errors for the caller to log.

mod command;
mod switch;
pub mod telemetry;

use std::collections::HashMap;

pub use command::{ALL_LIGHTS, ExternalCommand};
use serde_json::Value;
pub use switch::{AqaraButtons, SwitchProfile};

use crate::controller::{Action, SceneController};
use crate::device::LightDevice;
use crate::error::{ParseError, Result};
use crate::scene::Scene;
use crate::scheduler::{ScheduleTrigger, Scheduler, TimerId};

/// An input for one light.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Message from a wall switch.
    Switch {
        /// Switch id.
        id: String,
        /// Raw message.
        payload: Vec<u8>,
    },
    /// Message from a motion sensor.
    Motion {
        /// Sensor id.
        id: String,
        /// Raw message.
        payload: Vec<u8>,
    },
    /// Message from a door or window contact.
    Contact {
        /// Contact id.
        id: String,
        /// Raw message.
        payload: Vec<u8>,
    },
    /// Message on the external command channel.
    Command(Vec<u8>),
    /// Message from a device watched for custom events.
    CustomEvent {
        /// Device id.
        id: String,
        /// Raw message.
        payload: Vec<u8>,
    },
    /// Message from the device gating motion auto-on.
    AutoOnGate(Vec<u8>),
    /// The light reported new attributes.
    LightChanged,
    /// A controller timer fired.
    TimerFired(TimerId),
    /// A time window edge or sun crossing.
    Schedule(ScheduleTrigger),
}

/// How a motion sensor reports occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionInput {
    /// Payload field holding occupancy.
    pub field: String,
    /// Value meaning occupied. `None` requires a boolean field.
    pub true_value: Option<Value>,
}

impl Default for MotionInput {
    fn default() -> Self {
        Self {
            field: "occupancy".to_string(),
            true_value: None,
        }
    }
}

/// Telemetry input enabling or disabling motion auto-on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoOnGate {
    /// Payload field to read.
    pub field: String,
    /// Value meaning enabled.
    pub true_value: Value,
}

/// An action triggered by a field value on some device.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEvent {
    /// Payload field to read.
    pub field: String,
    /// Value triggering the action.
    pub value: Value,
    /// Action to run.
    pub action: Action,
    /// Transition in seconds.
    pub transition: f64,
    /// Scene for `set_scene`.
    pub scene: Option<Scene>,
}

/// Per-light input configuration of an [`EventRouter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterInputs {
    /// Names under which external commands address the light.
    pub names: Vec<String>,
    /// Switch profiles by switch id.
    pub switches: HashMap<String, SwitchProfile>,
    /// Motion inputs by sensor id.
    pub motion_sensors: HashMap<String, MotionInput>,
    /// Optional auto-on gate.
    pub auto_on_gate: Option<AutoOnGate>,
    /// Custom events by device id.
    pub events: HashMap<String, Vec<CustomEvent>>,
}

/// Dispatches [`InboundEvent`]s to a [`SceneController`].
#[derive(Debug)]
pub struct EventRouter<D, S> {
    controller: SceneController<D, S>,
    inputs: RouterInputs,
}

impl<D: LightDevice, S: Scheduler> EventRouter<D, S> {
    /// Creates a router for a controller.
    pub const fn new(controller: SceneController<D, S>, inputs: RouterInputs) -> Self {
        Self { controller, inputs }
    }

    /// Returns the controller.
    #[must_use]
    pub const fn controller(&self) -> &SceneController<D, S> {
        &self.controller
    }

    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError`](crate::error::SceneError) for rejected external
    /// requests, or an error if the device rejects a command. Malformed
    /// payloads are not errors.
    pub fn handle(&mut self, event: InboundEvent) -> Result<()> {
        match event {
            InboundEvent::Switch { id, payload } => self.on_switch(&id, &payload),
            InboundEvent::Motion { id, payload } => self.on_motion(&id, &payload),
            InboundEvent::Contact { id, payload } => self.on_contact(&id, &payload),
            InboundEvent::Command(payload) => self.on_command(&payload),
            InboundEvent::CustomEvent { id, payload } => self.on_custom_event(&id, &payload),
            InboundEvent::AutoOnGate(payload) => {
                self.on_auto_on_gate(&payload);
                Ok(())
            }
            InboundEvent::LightChanged => self.controller.on_light_changed(),
            InboundEvent::TimerFired(id) => self.controller.on_timer(id),
            InboundEvent::Schedule(trigger) => self.controller.on_schedule(trigger),
        }
    }

    fn on_switch(&mut self, id: &str, payload: &[u8]) -> Result<()> {
        let Some(profile) = self.inputs.switches.get(id) else {
            tracing::debug!(light = %self.controller.name(), switch = id, "Unknown switch");
            return Ok(());
        };
        let resolved = telemetry::parse_payload(payload)
            .and_then(|value| telemetry::action(&value).map(|a| (a.to_string(), profile.resolve(a))));
        match resolved {
            Ok((action, Some(switch_action))) => {
                tracing::debug!(light = %self.controller.name(), switch = id, action = %action, "Switch action");
                self.controller.on_switch(switch_action)
            }
            Ok((action, None)) => {
                tracing::trace!(light = %self.controller.name(), switch = id, action = %action, "Unmapped switch action");
                Ok(())
            }
            Err(e) => {
                ignored(self.controller.name(), id, &e);
                Ok(())
            }
        }
    }

    fn on_motion(&mut self, id: &str, payload: &[u8]) -> Result<()> {
        let Some(input) = self.inputs.motion_sensors.get(id) else {
            tracing::debug!(light = %self.controller.name(), sensor = id, "Unknown motion sensor");
            return Ok(());
        };
        let occupied = telemetry::parse_payload(payload).and_then(|value| {
            telemetry::occupancy(&value, &input.field, input.true_value.as_ref())
        });
        match occupied {
            Ok(occupied) => self.controller.on_motion(id, occupied),
            Err(e) => {
                ignored(self.controller.name(), id, &e);
                Ok(())
            }
        }
    }

    fn on_contact(&mut self, id: &str, payload: &[u8]) -> Result<()> {
        match telemetry::parse_payload(payload).and_then(|value| telemetry::contact(&value)) {
            Ok(closed) => self.controller.on_contact(id, closed),
            Err(e) => {
                ignored(self.controller.name(), id, &e);
                Ok(())
            }
        }
    }

    fn on_command(&mut self, payload: &[u8]) -> Result<()> {
        let command = match ExternalCommand::from_slice(payload) {
            Ok(command) => command,
            Err(e) => {
                ignored(self.controller.name(), "command", &e);
                return Ok(());
            }
        };
        let names: Vec<&str> = self.inputs.names.iter().map(String::as_str).collect();
        if !command.targets(&names) {
            return Ok(());
        }
        let action = command.action()?;
        // the scene field means nothing to other verbs
        let scene = match action {
            Action::SetScene => command.scene()?,
            _ => None,
        };
        tracing::info!(light = %self.controller.name(), action = %action, "External command");
        self.controller
            .process_action(action, command.transition_seconds(), scene)
    }

    fn on_custom_event(&mut self, id: &str, payload: &[u8]) -> Result<()> {
        let Some(events) = self.inputs.events.get(id) else {
            return Ok(());
        };
        let value = match telemetry::parse_payload(payload) {
            Ok(value) => value,
            Err(e) => {
                ignored(self.controller.name(), id, &e);
                return Ok(());
            }
        };
        let triggered: Vec<CustomEvent> = events
            .iter()
            .filter(|event| telemetry::field_equals(&value, &event.field, &event.value).unwrap_or(false))
            .cloned()
            .collect();
        for event in triggered {
            tracing::info!(
                light = %self.controller.name(),
                source = id,
                action = %event.action,
                "Custom event"
            );
            if let Err(e) = self
                .controller
                .process_action(event.action, event.transition, event.scene)
            {
                tracing::warn!(
                    light = %self.controller.name(),
                    source = id,
                    action = %event.action,
                    error = %e,
                    "Custom event failed"
                );
            }
        }
        Ok(())
    }

    fn on_auto_on_gate(&mut self, payload: &[u8]) {
        let Some(gate) = &self.inputs.auto_on_gate else {
            return;
        };
        let enabled = telemetry::parse_payload(payload)
            .and_then(|value| telemetry::field_equals(&value, &gate.field, &gate.true_value));
        match enabled {
            Ok(enabled) => self.controller.set_auto_on_enabled(enabled),
            Err(e) => ignored(self.controller.name(), "auto_on_gate", &e),
        }
    }
}

fn ignored(light: &str, source: &str, error: &ParseError) {
    tracing::trace!(light, source, error = %error, "Ignoring payload");
}
