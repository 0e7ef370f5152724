// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! scenectl daemon: wires the MQTT bridge, one controller per light, and
//! the schedule tasks together, then runs until interrupted.

use std::sync::Arc;
use std::time::Duration;

use scenectl::config::Config;
use scenectl::protocol::{MqttBridge, TopicRouter};
use scenectl::router::EventRouter;
use scenectl::runtime::{self, TokioScheduler};
use scenectl::SceneController;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const INITIAL_STATE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scenectl.json".to_string());

    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(config = %config_path, lights = config.lights.len(), "scenectl starting");

    let topics = Arc::new(TopicRouter::new());
    let mut bridge = MqttBridge::new(&config.mqtt)?;

    let mut lights = Vec::with_capacity(config.lights.len());
    for light_config in &config.lights {
        let (tx, rx) = mpsc::unbounded_channel();
        let device = bridge.light(light_config.mqtt_name(), light_config.status_topic.clone());
        runtime::register_light(
            &topics,
            &config.mqtt,
            light_config,
            &tx,
            Arc::clone(device.attributes()),
        );
        lights.push((light_config, device, tx, rx));
    }

    bridge.start(Arc::clone(&topics));

    let deadline = tokio::time::Instant::now() + INITIAL_STATE_TIMEOUT;
    let mut tasks = Vec::new();
    let mut queues = Vec::with_capacity(lights.len());
    for (light_config, device, tx, mut rx) in lights {
        if let Err(e) = device.request_state() {
            tracing::warn!(light = %light_config.name, error = %e, "State request failed");
        }
        let (reported, pending) = runtime::wait_for_state(&mut rx, deadline).await;
        if !reported {
            tracing::warn!(light = %light_config.name, "No state reported, assuming off");
        }

        let settings = light_config.controller_settings();
        tasks.extend(runtime::spawn_window_triggers(&settings, &tx));

        let scheduler = TokioScheduler::new(tx.clone());
        let mut controller = SceneController::new(settings, device, scheduler);
        if let Err(e) = controller.start() {
            tracing::warn!(light = %light_config.name, error = %e, "Startup reconcile failed");
        }

        let mut router = EventRouter::new(controller, light_config.router_inputs()?);
        for event in pending {
            if let Err(e) = router.handle(event) {
                tracing::warn!(light = %light_config.name, error = %e, "Event rejected");
            }
        }
        tasks.push(tokio::spawn(async move {
            runtime::run(router, rx).await;
        }));
        queues.push(tx);
    }

    if let Some(location) = config.location {
        tasks.push(runtime::spawn_sun_tracker(location, queues.clone()));
    }
    drop(queues);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    for task in tasks {
        task.abort();
    }
    bridge.disconnect().await;
    Ok(())
}

