// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT topic routing into per-light event queues.
//!
//! The [`TopicRouter`] maps each subscribed topic to the light queues that
//! consume it. One topic may feed several lights (a switch shared by two
//! lights, the common command topic) and one light may consume a topic in
//! several roles (a remote that is both a switch and a custom event source).
//!
//! # Architecture
//!
//! ```text
//! MQTT Message: zigbee2mqtt/hall_motion → {"occupancy": true}
//!                     ↓
//!             TopicRouter.route()
//!                     ↓
//!      Lookup "zigbee2mqtt/hall_motion" in routes
//!                     ↓
//!   queue.send(InboundEvent::Motion { id: "hall_motion", .. })
//!                     ↓
//!          Light task runs EventRouter::handle
//! ```
//!
//! Light state messages are merged into the light's attribute cache here,
//! before `LightChanged` is queued, so the controller always reads the
//! state that triggered the event.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use crate::device::LightAttributes;
use crate::router::{InboundEvent, telemetry};

/// The role a topic plays for one light.
#[derive(Debug, Clone)]
pub enum InputKind {
    /// Wall switch with the given id.
    Switch(String),
    /// Motion sensor with the given id.
    Motion(String),
    /// Door or window contact with the given id.
    Contact(String),
    /// Device watched for custom events.
    CustomEvent(String),
    /// Device gating motion auto-on.
    AutoOnGate,
    /// External command channel.
    Command,
    /// The light's own state, cached in the shared attributes.
    LightState(Arc<RwLock<LightAttributes>>),
}

#[derive(Debug, Clone)]
struct Route {
    queue: UnboundedSender<InboundEvent>,
    kind: InputKind,
}

/// Routes MQTT messages to light event queues.
#[derive(Debug, Default)]
pub struct TopicRouter {
    routes: RwLock<HashMap<String, Vec<Route>>>,
}

impl TopicRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a light queue for a topic.
    pub fn register(
        &self,
        topic: impl Into<String>,
        queue: &UnboundedSender<InboundEvent>,
        kind: InputKind,
    ) {
        let topic = topic.into();
        tracing::debug!(topic = %topic, ?kind, "Registering topic route");
        self.routes.write().entry(topic).or_default().push(Route {
            queue: queue.clone(),
            kind,
        });
    }

    /// Returns every registered topic, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.routes.read().keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Routes a message to every queue registered for its topic.
    ///
    /// Returns the number of events queued.
    pub fn route(&self, topic: &str, payload: &[u8]) -> usize {
        let routes = {
            let routes = self.routes.read();
            match routes.get(topic) {
                Some(routes) => routes.clone(),
                None => {
                    tracing::trace!(topic = %topic, "No route for topic");
                    return 0;
                }
            }
        };

        let mut delivered = 0;
        let mut closed = false;
        for route in routes {
            let Some(event) = to_event(&route.kind, topic, payload) else {
                continue;
            };
            if route.queue.send(event).is_ok() {
                delivered += 1;
            } else {
                closed = true;
            }
        }
        if closed {
            self.cleanup();
        }
        delivered
    }

    /// Removes routes whose light queue has been dropped.
    pub fn cleanup(&self) {
        self.routes.write().retain(|topic, routes| {
            routes.retain(|route| !route.queue.is_closed());
            if routes.is_empty() {
                tracing::debug!(topic = %topic, "Removing topic without live queues");
            }
            !routes.is_empty()
        });
    }

    /// Returns the number of routed topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.routes.read().len()
    }
}

/// Builds a zigbee2mqtt device topic.
#[must_use]
pub fn device_topic(base_topic: &str, device: &str) -> String {
    format!("{base_topic}/{device}")
}

fn to_event(kind: &InputKind, topic: &str, payload: &[u8]) -> Option<InboundEvent> {
    let payload_owned = || payload.to_vec();
    let event = match kind {
        InputKind::Switch(id) => InboundEvent::Switch {
            id: id.clone(),
            payload: payload_owned(),
        },
        InputKind::Motion(id) => InboundEvent::Motion {
            id: id.clone(),
            payload: payload_owned(),
        },
        InputKind::Contact(id) => InboundEvent::Contact {
            id: id.clone(),
            payload: payload_owned(),
        },
        InputKind::CustomEvent(id) => InboundEvent::CustomEvent {
            id: id.clone(),
            payload: payload_owned(),
        },
        InputKind::AutoOnGate => InboundEvent::AutoOnGate(payload_owned()),
        InputKind::Command => InboundEvent::Command(payload_owned()),
        InputKind::LightState(attributes) => {
            let merged = telemetry::parse_payload(payload)
                .and_then(|update| attributes.write().merge(&update));
            if let Err(e) = merged {
                tracing::trace!(topic = %topic, error = %e, "Ignoring light state");
                return None;
            }
            InboundEvent::LightChanged
        }
    };
    Some(event)
}
