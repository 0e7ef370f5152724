// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Async runtime pieces.
//!
//! Each light gets an unbounded event queue and one task running [`run`],
//! which owns the light's [`EventRouter`]. Everything that can change the
//! light's state, including its own timers, reaches it through that queue,
//! so the controller is never touched concurrently.

mod daily;
mod scheduler;
mod sun;

pub use daily::{JITTER_MAX, JITTER_MIN, jitter, spawn_daily, spawn_window_triggers, until_next};
pub use scheduler::TokioScheduler;
pub use sun::{spawn_sun_tracker, sun_state};

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crate::config::{LightConfig, MqttConfig};
use crate::device::{LightAttributes, LightDevice};
use crate::protocol::{InputKind, TopicRouter, device_topic};
use crate::router::{EventRouter, InboundEvent};
use crate::scheduler::Scheduler;

/// Registers every topic a light consumes.
///
/// `attributes` is the light's attribute cache, updated from its state
/// topic.
pub fn register_light(
    router: &TopicRouter,
    mqtt: &MqttConfig,
    light: &LightConfig,
    queue: &UnboundedSender<InboundEvent>,
    attributes: Arc<RwLock<LightAttributes>>,
) {
    let topic = |device: &str| device_topic(&mqtt.base_topic, device);

    router.register(topic(light.mqtt_name()), queue, InputKind::LightState(attributes));
    router.register(mqtt.command_topic.clone(), queue, InputKind::Command);
    for switch in &light.switches {
        router.register(topic(&switch.name), queue, InputKind::Switch(switch.name.clone()));
    }
    for sensor in &light.motion_sensors {
        router.register(topic(&sensor.name), queue, InputKind::Motion(sensor.name.clone()));
    }
    for contact in &light.contacts {
        router.register(topic(&contact.name), queue, InputKind::Contact(contact.name.clone()));
    }
    if let Some(gate) = &light.turn_on_enable {
        router.register(topic(&gate.name), queue, InputKind::AutoOnGate);
    }
    let mut event_sources: Vec<&str> = light.events.iter().map(|e| e.name.as_str()).collect();
    event_sources.sort_unstable();
    event_sources.dedup();
    for source in event_sources {
        router.register(topic(source), queue, InputKind::CustomEvent(source.to_string()));
    }
}

/// Waits until the light reports its state or `deadline` passes.
///
/// Returns whether a state report arrived, and every other event received
/// meanwhile, in order, for replay once the controller exists.
pub async fn wait_for_state(
    queue: &mut UnboundedReceiver<InboundEvent>,
    deadline: Instant,
) -> (bool, Vec<InboundEvent>) {
    let mut pending = Vec::new();
    loop {
        match tokio::time::timeout_at(deadline, queue.recv()).await {
            Ok(Some(InboundEvent::LightChanged)) => return (true, pending),
            Ok(Some(event)) => pending.push(event),
            Ok(None) | Err(_) => return (false, pending),
        }
    }
}

/// Processes a light's events in order until its queue closes.
///
/// Rejected requests and device errors are logged and do not stop the
/// loop.
pub async fn run<D: LightDevice, S: Scheduler>(
    mut router: EventRouter<D, S>,
    mut queue: UnboundedReceiver<InboundEvent>,
) -> EventRouter<D, S> {
    while let Some(event) = queue.recv().await {
        if let Err(e) = router.handle(event) {
            tracing::warn!(light = %router.controller().name(), error = %e, "Event rejected");
        }
    }
    tracing::debug!(light = %router.controller().name(), "Event queue closed");
    router
}
