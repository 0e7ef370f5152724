// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event loop tests on tokio's paused clock.

use std::time::Duration;

use scenectl::controller::{ControllerSettings, MotionSensorSettings};
use scenectl::device::{LightAttributes, LightCommand};
use scenectl::router::{MotionInput, RouterInputs};
use scenectl::runtime::{self, TokioScheduler};
use scenectl::testing::SimulatedLight;
use scenectl::types::Brightness;
use scenectl::{EventRouter, InboundEvent, SceneController};
use tokio::sync::mpsc;
use tokio::time::sleep;

const DIM: LightCommand = LightCommand::On {
    brightness: Some(Brightness::new(8)),
    color_temp: None,
    transition: 5.0,
};

fn spawn_hall(
    light: &SimulatedLight,
) -> (mpsc::UnboundedSender<InboundEvent>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut settings = ControllerSettings::new("light.hall");
    settings.motion_sensors.push(MotionSensorSettings::new("hall_motion"));

    let mut controller = SceneController::new(settings, light.clone(), TokioScheduler::new(tx.clone()));
    controller.start().unwrap();

    let mut inputs = RouterInputs::default();
    inputs.motion_sensors.insert(
        "hall_motion".to_string(),
        MotionInput {
            field: "occupancy".to_string(),
            true_value: None,
        },
    );
    let router = EventRouter::new(controller, inputs);
    let task = tokio::spawn(async move {
        runtime::run(router, rx).await;
    });
    (tx, task)
}

fn motion(occupied: bool) -> InboundEvent {
    InboundEvent::Motion {
        id: "hall_motion".to_string(),
        payload: format!(r#"{{"occupancy":{occupied}}}"#).into_bytes(),
    }
}

#[tokio::test(start_paused = true)]
async fn unattended_light_dims_then_turns_off() {
    let light = SimulatedLight::new(LightAttributes::on(255, Some(250)));
    let (_tx, task) = spawn_hall(&light);

    sleep(Duration::from_secs(299)).await;
    assert!(light.commands().is_empty());

    sleep(Duration::from_secs(2)).await;
    assert_eq!(light.commands(), vec![DIM]);

    sleep(Duration::from_secs(8)).await;
    assert_eq!(light.commands(), vec![DIM, LightCommand::Off { transition: 0.0 }]);

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn motion_restarts_the_timeout() {
    let light = SimulatedLight::new(LightAttributes::on(255, Some(250)));
    let (tx, task) = spawn_hall(&light);

    sleep(Duration::from_secs(100)).await;
    tx.send(motion(true)).unwrap();
    sleep(Duration::from_secs(10)).await;
    tx.send(motion(false)).unwrap();

    // the timer armed at startup was cancelled
    sleep(Duration::from_secs(250)).await;
    assert!(light.commands().is_empty());

    // re-armed at t=110, so the dim lands at t=410
    sleep(Duration::from_secs(51)).await;
    assert_eq!(light.commands(), vec![DIM]);

    sleep(Duration::from_secs(8)).await;
    assert_eq!(light.commands(), vec![DIM, LightCommand::Off { transition: 0.0 }]);

    task.abort();
}
