// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for `scenectl`.
//!
//! Errors are split by the boundary they come from: rejected requests
//! (scene or action names), malformed telemetry, configuration problems and
//! transport failures. Only configuration errors are fatal; everything else
//! is confined to the request or message that caused it.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A request named a scene or action the controller does not know.
    #[error("request rejected: {0}")]
    Scene(#[from] SceneError),

    /// A telemetry or command payload could not be interpreted.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Communication with the transport failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors rejecting a single request.
///
/// These never change controller state and never reach the device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The scene name is unknown or the scene cannot be dispatched.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// The external command verb is unknown.
    #[error("invalid action: {0}")]
    InvalidAction(String),
}

/// Errors related to parsing telemetry and command payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload does not carry the expected field.
    #[error("payload is missing field: {field}")]
    MalformedPayload {
        /// The field that was expected.
        field: String,
    },

    /// A field is present but holds an unusable value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

impl ParseError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MalformedPayload {
            field: field.into(),
        }
    }

    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A switch declares a type with no known button mapping.
    #[error("unknown switch type: {0}")]
    InvalidSwitchType(String),

    /// A value violates a configuration constraint.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Errors related to transport communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client request failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_error_display() {
        let err = SceneError::InvalidScene("PARTY".to_string());
        assert_eq!(err.to_string(), "invalid scene: PARTY");
    }

    #[test]
    fn error_from_scene_error() {
        let err: Error = SceneError::InvalidAction("explode".to_string()).into();
        assert!(matches!(
            err,
            Error::Scene(SceneError::InvalidAction(ref a)) if a == "explode"
        ));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::missing("occupancy");
        assert_eq!(err.to_string(), "payload is missing field: occupancy");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidSwitchType("ikea".to_string());
        assert_eq!(err.to_string(), "unknown switch type: ikea");
    }
}
