// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport for zigbee2mqtt lights and sensors.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

use parking_lot::RwLock;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS, SubscribeFilter};
use tokio::task::JoinHandle;

use crate::config::MqttConfig;
use crate::device::{LightAttributes, LightCommand, LightDevice};
use crate::error::ProtocolError;
use crate::protocol::{TopicRouter, device_topic};

/// A single broker connection shared by every light.
///
/// Uses the zigbee2mqtt topic structure:
/// - State: `<base>/<device>`
/// - Commands: `<base>/<device>/set`
/// - State requests: `<base>/<device>/get`
///
/// Light adapters can be created as soon as the bridge exists. Incoming
/// publishes are handed to the [`TopicRouter`] once [`MqttBridge::start`]
/// runs the event loop. Subscriptions are (re)issued on every broker
/// connect from the router's topics.
pub struct MqttBridge {
    client: AsyncClient,
    base_topic: String,
    event_loop: Option<EventLoop>,
    event_loop_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for MqttBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBridge")
            .field("base_topic", &self.base_topic)
            .field("started", &self.event_loop_task.is_some())
            .finish_non_exhaustive()
    }
}

impl MqttBridge {
    /// Creates the client. No connection is made until [`MqttBridge::start`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the broker URL cannot be
    /// parsed.
    pub fn new(config: &MqttConfig) -> Result<Self, ProtocolError> {
        let (host, port) = parse_mqtt_url(&config.url)?;

        // PID + counter to avoid conflicts between instances
        let client_id = config.client_id.clone().unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("scenectl_{}_{}", std::process::id(), counter)
        });

        let mut mqtt_options = MqttOptions::new(&client_id, host, port);
        mqtt_options.set_keep_alive(Duration::from_secs(30));
        mqtt_options.set_clean_session(true);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        tracing::debug!(broker = %config.url, client_id = %client_id, "MQTT client created");

        Ok(Self {
            client,
            base_topic: config.base_topic.clone(),
            event_loop: Some(event_loop),
            event_loop_task: None,
        })
    }

    /// Spawns the event loop task, routing every publish through `router`.
    ///
    /// Must be called from within a tokio runtime. Calling it again does
    /// nothing.
    pub fn start(&mut self, router: Arc<TopicRouter>) {
        let Some(event_loop) = self.event_loop.take() else {
            return;
        };
        tracing::info!(topics = router.topic_count(), "Connecting to MQTT broker");
        self.event_loop_task = Some(tokio::spawn(handle_mqtt_events(
            event_loop,
            self.client.clone(),
            router,
        )));
    }

    /// Returns the state topic of a zigbee2mqtt device.
    #[must_use]
    pub fn device_topic(&self, device: &str) -> String {
        device_topic(&self.base_topic, device)
    }

    /// Creates the device adapter for a light.
    #[must_use]
    pub fn light(&self, mqtt_name: &str, status_topic: Option<String>) -> Zigbee2MqttLight {
        let topic = self.device_topic(mqtt_name);
        Zigbee2MqttLight {
            client: self.client.clone(),
            set_topic: format!("{topic}/set"),
            get_topic: format!("{topic}/get"),
            status_topic,
            attributes: Arc::new(RwLock::new(LightAttributes::OFF)),
        }
    }

    /// Disconnects from the broker and stops the event loop task.
    pub async fn disconnect(self) {
        if let Err(e) = self.client.disconnect().await {
            tracing::debug!(error = %e, "MQTT disconnect request failed");
        }
        if let Some(task) = self.event_loop_task {
            task.abort();
        }
    }
}

/// A zigbee2mqtt light.
///
/// Commands are queued with `try_publish` and never wait for the broker.
/// Attributes are the last state received on the light's state topic; the
/// [`TopicRouter`] keeps them current through [`Zigbee2MqttLight::attributes`].
#[derive(Debug, Clone)]
pub struct Zigbee2MqttLight {
    client: AsyncClient,
    set_topic: String,
    get_topic: String,
    status_topic: Option<String>,
    attributes: Arc<RwLock<LightAttributes>>,
}

impl Zigbee2MqttLight {
    /// Returns the shared attribute cache.
    #[must_use]
    pub fn attributes(&self) -> &Arc<RwLock<LightAttributes>> {
        &self.attributes
    }

    /// Asks zigbee2mqtt to publish the light's current state.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the request could not be queued.
    pub fn request_state(&self) -> Result<(), ProtocolError> {
        let payload = serde_json::json!({"state": "", "brightness": "", "color_temp": ""});
        self.client
            .try_publish(&self.get_topic, QoS::AtLeastOnce, false, payload.to_string())
            .map_err(ProtocolError::Mqtt)
    }
}

impl LightDevice for Zigbee2MqttLight {
    fn send(&self, command: &LightCommand) -> Result<(), ProtocolError> {
        let payload = command.to_payload().to_string();
        tracing::debug!(topic = %self.set_topic, payload = %payload, "Publishing light command");
        self.client
            .try_publish(&self.set_topic, QoS::AtLeastOnce, false, payload)
            .map_err(ProtocolError::Mqtt)
    }

    fn read_attributes(&self) -> LightAttributes {
        *self.attributes.read()
    }

    fn publish_status(&self, label: &str) -> Result<(), ProtocolError> {
        let Some(topic) = &self.status_topic else {
            return Ok(());
        };
        self.client
            .try_publish(topic, QoS::AtLeastOnce, true, label)
            .map_err(ProtocolError::Mqtt)
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), 1883)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress("missing host".to_string()));
    }

    Ok((host, port))
}

/// Polls the event loop forever, routing publishes and resubscribing after
/// every connect.
async fn handle_mqtt_events(mut event_loop: EventLoop, client: AsyncClient, router: Arc<TopicRouter>) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::info!(code = ?connack.code, "MQTT connected");
                subscribe_all(&client, &router);
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::trace!(topic = %publish.topic, "Received MQTT message");
                router.route(&publish.topic, &publish.payload);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "MQTT event loop error");
                // rumqttc reconnects on the next poll
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn subscribe_all(client: &AsyncClient, router: &TopicRouter) {
    let filters: Vec<SubscribeFilter> = router
        .topics()
        .into_iter()
        .map(|topic| SubscribeFilter::new(topic, QoS::AtLeastOnce))
        .collect();
    if filters.is_empty() {
        return;
    }
    let count = filters.len();
    match client.try_subscribe_many(filters) {
        Ok(()) => tracing::debug!(count, "Subscribing to routed topics"),
        Err(e) => tracing::warn!(error = %e, "Failed to queue subscriptions"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Brightness;

    #[test]
    fn parse_mqtt_url_with_port() {
        let (host, port) = parse_mqtt_url("mqtt://192.168.1.50:1883").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_default_port() {
        let (host, port) = parse_mqtt_url("broker.local").unwrap();
        assert_eq!(host, "broker.local");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_invalid() {
        assert!(matches!(
            parse_mqtt_url("mqtt://broker:port"),
            Err(ProtocolError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_mqtt_url("mqtt://:1883"),
            Err(ProtocolError::InvalidAddress(_))
        ));
    }

    #[test]
    fn bridge_builds_light_topics() {
        let config = MqttConfig {
            base_topic: "z2m".to_string(),
            ..MqttConfig::default()
        };
        let bridge = MqttBridge::new(&config).unwrap();
        assert_eq!(bridge.device_topic("hall_light"), "z2m/hall_light");

        let light = bridge.light("hall_light", Some("scenectl/hall/status".to_string()));
        assert_eq!(light.set_topic, "z2m/hall_light/set");
        assert_eq!(light.get_topic, "z2m/hall_light/get");
    }

    #[test]
    fn light_queues_commands_without_broker() {
        let options = MqttOptions::new("test", "localhost", 1883);
        let (client, _event_loop) = AsyncClient::new(options, 10);
        let light = Zigbee2MqttLight {
            client,
            set_topic: "z2m/hall_light/set".to_string(),
            get_topic: "z2m/hall_light/get".to_string(),
            status_topic: None,
            attributes: Arc::new(RwLock::new(LightAttributes::OFF)),
        };

        let command = LightCommand::On {
            brightness: Some(Brightness::new(76)),
            color_temp: None,
            transition: 0.0,
        };
        assert!(light.send(&command).is_ok());
        assert!(light.publish_status("Dimm").is_ok());
        assert_eq!(light.read_attributes(), LightAttributes::OFF);

        *light.attributes().write() = LightAttributes::on(76, Some(400));
        assert_eq!(light.read_attributes(), LightAttributes::on(76, Some(400)));
    }
}
