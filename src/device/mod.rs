// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light device abstraction.
//!
//! The controller never talks to a transport directly. It reads the last
//! known attributes and sends commands through the [`LightDevice`] trait,
//! which is implemented by the MQTT adapter
//! ([`Zigbee2MqttLight`](crate::protocol::Zigbee2MqttLight)) and by the
//! in-memory light used in tests.
//!
//! Commands are fire-and-forget: `send` must not wait for the light to
//! acknowledge. The new state arrives later as an ordinary light-state event.

mod light;

pub use light::{LightAttributes, LightCommand};

use crate::error::ProtocolError;

/// A light the controller can observe and command.
pub trait LightDevice {
    /// Queues a command for the light.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the command could not be queued.
    fn send(&self, command: &LightCommand) -> Result<(), ProtocolError>;

    /// Returns the last attributes reported by the light.
    fn read_attributes(&self) -> LightAttributes;

    /// Publishes a human-readable status label for the light.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the label could not be queued.
    fn publish_status(&self, label: &str) -> Result<(), ProtocolError> {
        let _ = label;
        Ok(())
    }
}
