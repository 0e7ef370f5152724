// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport between the broker and the per-light event queues.
//!
//! - [`TopicRouter`]: maps topics to light queues and input roles
//! - [`MqttBridge`]: the shared broker connection (feature `mqtt`)
//! - [`Zigbee2MqttLight`]: [`LightDevice`](crate::device::LightDevice) over
//!   zigbee2mqtt topics (feature `mqtt`)

#[cfg(feature = "mqtt")]
mod mqtt;
mod topic_router;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttBridge, Zigbee2MqttLight};
pub use topic_router::{InputKind, TopicRouter, device_topic};
