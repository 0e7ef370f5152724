// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `scenectl` - scene control for zigbee2mqtt lights.
//!
//! Each configured light is driven by a scene state machine that reacts to
//! wall switches, motion sensors, door contacts, external commands, time
//! windows and the position of the sun.
//!
//! # Scenes
//!
//! - **Cold**, **Warm**, **Dimm**: fixed brightness and color temperature
//!   targets from the [`SceneCatalog`]
//! - **Off**, **On**: derived from the light's power state
//! - **`MotionDimmed`**: the light was dimmed because nobody moved for a while
//! - **Undefined**: on, but matching no known scene
//!
//! The current scene is always re-derived from what the light reports, so
//! changes made by other tools are picked up.
//!
//! # Architecture
//!
//! ```text
//!   MQTT broker ──▶ MqttBridge ──▶ TopicRouter ──▶ per-light queue
//!                                                        │
//!   TokioScheduler (timers) ─────────────────────────────┤
//!   daily window edges, sun tracker ─────────────────────┤
//!                                                        ▼
//!                                   EventRouter ──▶ SceneController
//!                                                        │
//!                                          LightDevice ◀─┘
//! ```
//!
//! The controller only sees the [`LightDevice`](device::LightDevice) and
//! [`Scheduler`](scheduler::Scheduler) traits. With the `testing-support`
//! feature, the [`testing`] module provides in-memory implementations of
//! both.
//!
//! # Quick Start
//!
//! ```
//! use scenectl::config::Config;
//!
//! let config = Config::from_json(r#"{
//!     "lights": [{
//!         "name": "light.kitchen",
//!         "switches": [{"name": "kitchen_switch"}],
//!         "motion_sensors": [{"name": "kitchen_motion"}]
//!     }]
//! }"#).unwrap();
//!
//! let light = &config.lights[0];
//! let settings = light.controller_settings();
//! assert_eq!(settings.timings.motion_timeout.as_secs(), 300);
//! assert!(light.router_inputs().unwrap().switches.contains_key("kitchen_switch"));
//! ```

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod protocol;
pub mod router;
pub mod runtime;
pub mod scene;
pub mod scheduler;
#[cfg(any(test, feature = "testing-support"))]
pub mod testing;
pub mod types;

pub use config::Config;
pub use controller::{Action, SceneController};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, SceneError};
pub use router::{EventRouter, InboundEvent};
pub use scene::{Scene, SceneCatalog};
