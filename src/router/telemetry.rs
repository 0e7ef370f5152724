// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field extraction from zigbee2mqtt device messages.
//!
//! Devices publish a JSON object with every attribute they know about.
//! Messages that do not carry the field an input cares about are common
//! (battery or link quality updates) and are reported as
//! [`ParseError::MalformedPayload`] so the router can drop them quietly.

use serde_json::Value;

use crate::error::ParseError;

/// Parses a device message.
///
/// # Errors
///
/// Returns [`ParseError::Json`] if the payload is not valid JSON.
pub fn parse_payload(payload: &[u8]) -> Result<Value, ParseError> {
    Ok(serde_json::from_slice(payload)?)
}

fn field<'a>(payload: &'a Value, name: &str) -> Result<&'a Value, ParseError> {
    match payload.get(name) {
        None | Some(Value::Null) => Err(ParseError::missing(name)),
        Some(value) => Ok(value),
    }
}

/// Returns the switch `action` string.
///
/// Some switches publish an empty action after each press; that counts as
/// missing.
///
/// # Errors
///
/// Returns [`ParseError`] if the field is absent, empty, or not a string.
pub fn action(payload: &Value) -> Result<&str, ParseError> {
    match field(payload, "action")? {
        Value::String(s) if s.is_empty() => Err(ParseError::missing("action")),
        Value::String(s) => Ok(s),
        other => Err(ParseError::invalid("action", format!("expected string, got {other}"))),
    }
}

/// Returns the occupancy reported in `field`.
///
/// With a `true_value`, occupancy is equality with it and the field may hold
/// any JSON value. Otherwise the field must be a boolean.
///
/// # Errors
///
/// Returns [`ParseError`] if the field is absent, or not a boolean when no
/// `true_value` is given.
///
/// # Examples
///
/// ```
/// use scenectl::router::telemetry::occupancy;
/// use serde_json::json;
///
/// assert_eq!(occupancy(&json!({"occupancy": true}), "occupancy", None).unwrap(), true);
/// let on = json!("ON");
/// assert_eq!(occupancy(&json!({"state": "OFF"}), "state", Some(&on)).unwrap(), false);
/// ```
pub fn occupancy(
    payload: &Value,
    field_name: &str,
    true_value: Option<&Value>,
) -> Result<bool, ParseError> {
    let value = field(payload, field_name)?;
    match true_value {
        Some(expected) => Ok(value == expected),
        None => value
            .as_bool()
            .ok_or_else(|| ParseError::invalid(field_name, format!("expected boolean, got {value}"))),
    }
}

/// Returns the `contact` state: `true` when closed.
///
/// # Errors
///
/// Returns [`ParseError`] if the field is absent or not a boolean.
pub fn contact(payload: &Value) -> Result<bool, ParseError> {
    let value = field(payload, "contact")?;
    value
        .as_bool()
        .ok_or_else(|| ParseError::invalid("contact", format!("expected boolean, got {value}")))
}

/// Returns whether `field_name` holds `expected`.
///
/// # Errors
///
/// Returns [`ParseError::MalformedPayload`] if the field is absent.
pub fn field_equals(payload: &Value, field_name: &str, expected: &Value) -> Result<bool, ParseError> {
    Ok(field(payload, field_name)? == expected)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn action_field() {
        assert_eq!(action(&json!({"action": "single", "battery": 90})).unwrap(), "single");
        assert!(matches!(
            action(&json!({"action": ""})),
            Err(ParseError::MalformedPayload { .. })
        ));
        assert!(matches!(
            action(&json!({"battery": 90})),
            Err(ParseError::MalformedPayload { .. })
        ));
        assert!(matches!(
            action(&json!({"action": null})),
            Err(ParseError::MalformedPayload { .. })
        ));
        assert!(matches!(
            action(&json!({"action": 1})),
            Err(ParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn occupancy_boolean_field() {
        assert!(occupancy(&json!({"occupancy": true}), "occupancy", None).unwrap());
        assert!(!occupancy(&json!({"occupancy": false}), "occupancy", None).unwrap());
        assert!(occupancy(&json!({"occupancy": "yes"}), "occupancy", None).is_err());
        assert!(occupancy(&json!({"illuminance": 10}), "occupancy", None).is_err());
    }

    #[test]
    fn occupancy_true_value() {
        let t = json!(1);
        assert!(occupancy(&json!({"presence": 1}), "presence", Some(&t)).unwrap());
        assert!(!occupancy(&json!({"presence": 0}), "presence", Some(&t)).unwrap());
        assert!(!occupancy(&json!({"presence": "1"}), "presence", Some(&t)).unwrap());
    }

    #[test]
    fn contact_field() {
        assert!(contact(&json!({"contact": true})).unwrap());
        assert!(!contact(&json!({"contact": false, "battery": 100})).unwrap());
        assert!(contact(&json!({"battery": 100})).is_err());
    }

    #[test]
    fn payload_parsing() {
        assert!(parse_payload(br#"{"occupancy":true}"#).is_ok());
        assert!(matches!(parse_payload(b"offline"), Err(ParseError::Json(_))));
    }

    #[test]
    fn field_equality() {
        let expected = json!("arrive");
        assert!(field_equals(&json!({"action": "arrive"}), "action", &expected).unwrap());
        assert!(!field_equals(&json!({"action": "leave"}), "action", &expected).unwrap());
        assert!(field_equals(&json!({}), "action", &expected).is_err());
    }
}
