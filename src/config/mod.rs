// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration loading: a JSON file with environment variable overrides.
//!
//! Every field except the light list has a default. The configuration is
//! read and validated once at startup; any problem is fatal. After loading,
//! each light's section is turned into plain [`ControllerSettings`] and
//! [`RouterInputs`] values owned by that light's controller.
//!
//! Environment variables take precedence over file values:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SCENECTL_MQTT_URL` | `mqtt.url` |
//! | `SCENECTL_MQTT_USERNAME` | `mqtt.username` |
//! | `SCENECTL_MQTT_PASSWORD` | `mqtt.password` |
//! | `SCENECTL_LOG`, `RUST_LOG` | `log_level` |

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::controller::{ControllerSettings, DEFAULT_COLD_WINDOW, MotionSensorSettings, MotionTimings};
use crate::error::{ConfigError, ParseError};
use crate::router::{AqaraButtons, AutoOnGate, CustomEvent, MotionInput, RouterInputs, SwitchProfile};
use crate::scene::{Scene, SceneCatalog, SceneSettings};
use crate::types::{Brightness, ColorTemp, TimeWindow};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Broker settings.
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// Site coordinates. Enables sun tracking when set.
    #[serde(default)]
    pub location: Option<Location>,
    /// Log filter (`RUST_LOG` syntax).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Controlled lights.
    pub lights: Vec<LightConfig>,
}

/// MQTT broker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker URL, `mqtt://host:port`.
    pub url: String,
    /// zigbee2mqtt base topic.
    pub base_topic: String,
    /// Client id. Generated when unset.
    pub client_id: Option<String>,
    /// Broker username.
    pub username: Option<String>,
    /// Broker password.
    pub password: Option<String>,
    /// Topic receiving external commands.
    pub command_topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            url: "mqtt://localhost:1883".to_string(),
            base_topic: "zigbee2mqtt".to_string(),
            client_id: None,
            username: None,
            password: None,
            command_topic: "scenectl/set".to_string(),
        }
    }
}

/// Site coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    /// Latitude, -90 to 90.
    pub latitude: f64,
    /// Longitude, -180 to 180.
    pub longitude: f64,
}

/// Partial scene targets; missing values fall back to the scene default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Target brightness.
    pub brightness: Option<u8>,
    /// Target color temperature in mireds.
    pub color_temp: Option<u16>,
}

impl SceneConfig {
    fn resolve(self, default: SceneSettings) -> SceneSettings {
        SceneSettings {
            brightness: self.brightness.map_or(default.brightness, Brightness::new),
            color_temp: self.color_temp.map_or(default.color_temp, ColorTemp::new),
        }
    }
}

/// Cold window setting: a window, or `"disabled"` for always cold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ColdSceneTimeRepr")]
pub enum ColdSceneTime {
    /// No cold window: cold is the default at all times.
    Disabled,
    /// Cold is the default inside this window.
    Window(TimeWindow),
}

impl Default for ColdSceneTime {
    fn default() -> Self {
        Self::Window(DEFAULT_COLD_WINDOW)
    }
}

impl ColdSceneTime {
    const fn window(self) -> Option<TimeWindow> {
        match self {
            Self::Disabled => None,
            Self::Window(w) => Some(w),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColdSceneTimeRepr {
    Keyword(String),
    Window(TimeWindow),
}

impl TryFrom<ColdSceneTimeRepr> for ColdSceneTime {
    type Error = ParseError;

    fn try_from(repr: ColdSceneTimeRepr) -> Result<Self, Self::Error> {
        match repr {
            ColdSceneTimeRepr::Keyword(k) if k == "disabled" => Ok(Self::Disabled),
            ColdSceneTimeRepr::Keyword(k) => Err(ParseError::invalid(
                "cold_scene_time",
                format!("expected a window or \"disabled\", got {k:?}"),
            )),
            ColdSceneTimeRepr::Window(w) => Ok(Self::Window(w)),
        }
    }
}

/// A wall switch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwitchConfig {
    /// zigbee2mqtt device name.
    pub name: String,
    /// Switch family: `aqara`, `philips` or `philips_bind`.
    #[serde(rename = "type", default = "default_switch_type")]
    pub kind: String,
    /// Aqara single-press action.
    #[serde(default)]
    pub single: Option<String>,
    /// Aqara double-press action.
    #[serde(default)]
    pub double: Option<String>,
    /// Aqara long-press action.
    #[serde(default)]
    pub hold: Option<String>,
}

/// A motion sensor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MotionSensorConfig {
    /// zigbee2mqtt device name.
    pub name: String,
    /// Whether occupancy may turn the light on.
    #[serde(default = "default_true")]
    pub turn_on: bool,
    /// Payload field holding occupancy.
    #[serde(default = "default_monitored_field")]
    pub monitored_field: String,
    /// Value meaning occupied; the field must be boolean when unset.
    #[serde(default)]
    pub true_value: Option<Value>,
}

/// A door or window contact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactConfig {
    /// zigbee2mqtt device name.
    pub name: String,
}

/// Device gating motion auto-on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TurnOnEnableConfig {
    /// zigbee2mqtt device name.
    pub name: String,
    /// Payload field to read.
    #[serde(default = "default_gate_field")]
    pub field: String,
    /// Value meaning enabled.
    #[serde(default = "default_gate_value")]
    pub true_value: Value,
}

/// A custom action triggered by a device message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventConfig {
    /// zigbee2mqtt device name.
    pub name: String,
    /// Payload field to read.
    #[serde(default = "default_event_field")]
    pub field: String,
    /// Value triggering the action.
    pub value: Value,
    /// Action verb, as for external commands.
    pub action: String,
    /// Transition in seconds.
    #[serde(default)]
    pub transition: f64,
    /// Scene for `set_scene`.
    #[serde(default)]
    pub scene: Option<String>,
}

/// One controlled light.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightConfig {
    /// Light name, used in logs and by external commands.
    pub name: String,
    /// zigbee2mqtt device name. Defaults to `name`.
    #[serde(default)]
    pub mqtt_name: Option<String>,
    /// Whether the light accepts color temperature.
    #[serde(default = "default_true")]
    pub color_temp_support: bool,
    /// Move a lit light between cold and warm when the default changes.
    #[serde(default = "default_true")]
    pub auto_color_temp_change: bool,
    /// Cold scene targets.
    #[serde(default)]
    pub scene_cold: SceneConfig,
    /// Warm scene targets.
    #[serde(default)]
    pub scene_warm: SceneConfig,
    /// Dimmed scene targets.
    #[serde(default)]
    pub scene_dimm: SceneConfig,
    /// Debounce window in seconds.
    #[serde(default = "default_debounce")]
    pub debounce: f64,
    /// Wall switches.
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    /// Cold window.
    #[serde(default)]
    pub cold_scene_time: ColdSceneTime,
    /// Warm window.
    #[serde(default)]
    pub warm_scene_time: Option<TimeWindow>,
    /// Close the cold window while the sun is below the horizon.
    #[serde(default)]
    pub cold_requires_daylight: bool,
    /// Motion sensors.
    #[serde(default)]
    pub motion_sensors: Vec<MotionSensorConfig>,
    /// Seconds without motion before dimming.
    #[serde(default = "default_motion_timeout")]
    pub motion_timeout: u64,
    /// Seconds spent dimmed before turning off.
    #[serde(default = "default_power_off_cancel_timeout")]
    pub power_off_cancel_timeout: u64,
    /// Dim transition in seconds.
    #[serde(default = "default_power_off_transition")]
    pub motion_power_off_transition_time: u32,
    /// Brightness of the motion-dimmed state.
    #[serde(default = "default_dimmed_brightness")]
    pub brightness_dimmed_light: u8,
    /// Seconds after a manual switch-off during which motion is ignored.
    #[serde(default = "default_ignore_motion")]
    pub ignore_motion_after_turn_off_time: u64,
    /// Auto-on gate.
    #[serde(default)]
    pub turn_on_enable: Option<TurnOnEnableConfig>,
    /// Door and window contacts.
    #[serde(default)]
    pub contacts: Vec<ContactConfig>,
    /// Custom events.
    #[serde(default)]
    pub events: Vec<EventConfig>,
    /// Topic receiving the retained status label.
    #[serde(default)]
    pub status_topic: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_switch_type() -> String {
    "aqara".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_monitored_field() -> String {
    "occupancy".to_string()
}

fn default_gate_field() -> String {
    "state".to_string()
}

fn default_gate_value() -> Value {
    Value::String("ON".to_string())
}

fn default_event_field() -> String {
    "action".to_string()
}

const fn default_debounce() -> f64 {
    1.0
}

const fn default_motion_timeout() -> u64 {
    300
}

const fn default_power_off_cancel_timeout() -> u64 {
    8
}

const fn default_power_off_transition() -> u32 {
    5
}

const fn default_dimmed_brightness() -> u8 {
    8
}

const fn default_ignore_motion() -> u64 {
    5
}

impl Config {
    /// Loads a configuration file, applies environment overrides and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing or validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SCENECTL_MQTT_URL") {
            self.mqtt.url = val;
        }
        if let Some(val) = lookup("SCENECTL_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = lookup("SCENECTL_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = lookup("SCENECTL_LOG") {
            self.log_level = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.log_level = val;
        }
    }

    /// Checks constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.url.is_empty() {
            return Err(ConfigError::Validation("mqtt.url must not be empty".to_string()));
        }
        if self.mqtt.base_topic.is_empty() {
            return Err(ConfigError::Validation(
                "mqtt.base_topic must not be empty".to_string(),
            ));
        }
        if let Some(location) = self.location
            && (!(-90.0..=90.0).contains(&location.latitude)
                || !(-180.0..=180.0).contains(&location.longitude))
        {
            return Err(ConfigError::Validation(format!(
                "location out of range: {}, {}",
                location.latitude, location.longitude
            )));
        }
        if self.lights.is_empty() {
            return Err(ConfigError::Validation(
                "at least one light is required".to_string(),
            ));
        }
        let mut names = HashSet::new();
        for light in &self.lights {
            light.validate()?;
            if !names.insert(light.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate light name {:?}",
                    light.name
                )));
            }
        }
        Ok(())
    }
}

impl LightConfig {
    /// Returns the zigbee2mqtt device name.
    #[must_use]
    pub fn mqtt_name(&self) -> &str {
        self.mqtt_name.as_deref().unwrap_or(&self.name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| ConfigError::Validation(format!("light {:?}: {msg}", self.name));

        if self.name.is_empty() {
            return Err(ConfigError::Validation("light name must not be empty".to_string()));
        }
        if self.mqtt_name.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("mqtt_name must not be empty".to_string()));
        }
        if !self.debounce.is_finite() || self.debounce < 0.0 {
            return Err(invalid(format!("debounce must be non-negative, got {}", self.debounce)));
        }
        if self.brightness_dimmed_light == 0 {
            return Err(invalid("brightness_dimmed_light must be positive".to_string()));
        }
        let catalog = self.catalog();
        for scene in Scene::CATALOGED {
            if let Some(target) = catalog.settings(scene) {
                if target.brightness.is_zero() {
                    return Err(invalid(format!("{scene} brightness must be positive")));
                }
                if self.color_temp_support && !target.color_temp.is_in_range() {
                    return Err(invalid(format!(
                        "{scene} color_temp must be between {} and {}, got {}",
                        ColorTemp::MIN,
                        ColorTemp::MAX,
                        target.color_temp.value()
                    )));
                }
            }
        }
        let inputs = [
            self.switches.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            self.motion_sensors.iter().map(|s| s.name.as_str()).collect(),
            self.contacts.iter().map(|c| c.name.as_str()).collect(),
            self.events.iter().map(|e| e.name.as_str()).collect(),
            self.turn_on_enable.iter().map(|g| g.name.as_str()).collect(),
        ];
        if inputs.iter().flatten().any(|name| name.is_empty()) {
            return Err(invalid("input device names must not be empty".to_string()));
        }
        self.router_inputs().map(|_| ())
    }

    /// Builds the scene catalog.
    #[must_use]
    pub fn catalog(&self) -> SceneCatalog {
        SceneCatalog::new(
            self.scene_cold.resolve(SceneCatalog::DEFAULT_COLD),
            self.scene_warm.resolve(SceneCatalog::DEFAULT_WARM),
            self.scene_dimm.resolve(SceneCatalog::DEFAULT_DIMM),
            Brightness::new(self.brightness_dimmed_light),
            self.color_temp_support,
        )
    }

    /// Builds the controller settings.
    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            name: self.name.clone(),
            catalog: self.catalog(),
            debounce: Duration::try_from_secs_f64(self.debounce)
                .unwrap_or(ControllerSettings::DEFAULT_DEBOUNCE),
            cold_window: self.cold_scene_time.window(),
            warm_window: self.warm_scene_time,
            cold_requires_daylight: self.cold_requires_daylight,
            auto_color_temp_change: self.auto_color_temp_change,
            timings: MotionTimings {
                motion_timeout: Duration::from_secs(self.motion_timeout),
                power_off_cancel_timeout: Duration::from_secs(self.power_off_cancel_timeout),
                power_off_transition: self.motion_power_off_transition_time,
                ignore_motion_after_turn_off: Duration::from_secs(
                    self.ignore_motion_after_turn_off_time,
                ),
            },
            motion_sensors: self
                .motion_sensors
                .iter()
                .map(|s| MotionSensorSettings {
                    name: s.name.clone(),
                    turn_on: s.turn_on,
                })
                .collect(),
            contacts: self.contacts.iter().map(|c| c.name.clone()).collect(),
        }
    }

    /// Builds the router inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSwitchType`] for unknown switch types,
    /// or [`ConfigError::Validation`] for events naming an unknown action or
    /// scene.
    pub fn router_inputs(&self) -> Result<RouterInputs, ConfigError> {
        let mut inputs = RouterInputs {
            names: vec![self.name.clone(), self.mqtt_name().to_string()],
            ..RouterInputs::default()
        };
        for switch in &self.switches {
            let defaults = AqaraButtons::default();
            let buttons = AqaraButtons {
                single: switch.single.clone().unwrap_or(defaults.single),
                double: switch.double.clone().unwrap_or(defaults.double),
                hold: switch.hold.clone().unwrap_or(defaults.hold),
            };
            let profile = SwitchProfile::from_type(&switch.kind, buttons)?;
            inputs.switches.insert(switch.name.clone(), profile);
        }
        for sensor in &self.motion_sensors {
            inputs.motion_sensors.insert(
                sensor.name.clone(),
                MotionInput {
                    field: sensor.monitored_field.clone(),
                    true_value: sensor.true_value.clone(),
                },
            );
        }
        inputs.auto_on_gate = self.turn_on_enable.as_ref().map(|gate| AutoOnGate {
            field: gate.field.clone(),
            true_value: gate.true_value.clone(),
        });
        for event in &self.events {
            let invalid =
                |e: crate::error::SceneError| ConfigError::Validation(format!("event {:?}: {e}", event.name));
            if !event.transition.is_finite() || event.transition < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "event {:?}: transition must be a non-negative number of seconds",
                    event.name
                )));
            }
            let custom = CustomEvent {
                field: event.field.clone(),
                value: event.value.clone(),
                action: event.action.parse().map_err(invalid)?,
                transition: event.transition,
                scene: event
                    .scene
                    .as_deref()
                    .map(str::parse::<Scene>)
                    .transpose()
                    .map_err(invalid)?,
            };
            inputs.events.entry(event.name.clone()).or_default().push(custom);
        }
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::controller::Action;

    const MINIMAL: &str = r#"{"lights": [{"name": "light.kitchen"}]}"#;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::from_json(MINIMAL).unwrap();
        assert_eq!(config.mqtt, MqttConfig::default());
        assert_eq!(config.mqtt.command_topic, "scenectl/set");
        assert_eq!(config.log_level, "info");
        assert!(config.location.is_none());

        let light = &config.lights[0];
        assert_eq!(light.mqtt_name(), "light.kitchen");
        assert!(light.color_temp_support);
        assert!(light.auto_color_temp_change);

        let settings = light.controller_settings();
        assert_eq!(settings.catalog, SceneCatalog::default());
        assert_eq!(settings.debounce, Duration::from_secs(1));
        assert_eq!(settings.cold_window, Some(DEFAULT_COLD_WINDOW));
        assert_eq!(settings.warm_window, None);
        assert_eq!(settings.timings, MotionTimings::default());
    }

    #[test]
    fn should_parse_full_light() {
        let json = r#"{
            "mqtt": {"url": "mqtt://broker:1884", "base_topic": "z2m"},
            "location": {"latitude": 50.06, "longitude": 19.94},
            "lights": [{
                "name": "light.kitchen",
                "mqtt_name": "kitchen_light",
                "scene_cold": {"brightness": 200},
                "scene_dimm": {"brightness": 50, "color_temp": 454},
                "debounce": 0.5,
                "switches": [
                    {"name": "kitchen_switch", "single": "left"},
                    {"name": "hue_dimmer", "type": "philips_bind"}
                ],
                "cold_scene_time": "disabled",
                "warm_scene_time": {"start": "18:00", "end": "22:30"},
                "motion_sensors": [{"name": "kitchen_motion", "turn_on": false,
                                    "monitored_field": "presence", "true_value": 1}],
                "motion_timeout": 120,
                "turn_on_enable": {"name": "auto_switch"},
                "contacts": [{"name": "kitchen_door"}],
                "events": [{"name": "remote", "value": "arrive", "action": "force_turn_on"}],
                "status_topic": "scenectl/kitchen/status"
            }]
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.mqtt.base_topic, "z2m");
        assert_eq!(config.mqtt.command_topic, "scenectl/set");

        let light = &config.lights[0];
        assert_eq!(light.mqtt_name(), "kitchen_light");

        let settings = light.controller_settings();
        let cold = settings.catalog.settings(Scene::Cold).unwrap();
        assert_eq!(cold.brightness.value(), 200);
        assert_eq!(cold.color_temp.value(), 250);
        assert_eq!(settings.debounce, Duration::from_millis(500));
        assert_eq!(settings.cold_window, None);
        assert_eq!(settings.warm_window.unwrap().to_string(), "18:00:00-22:30:00");
        assert_eq!(settings.timings.motion_timeout, Duration::from_secs(120));
        assert!(!settings.motion_sensors[0].turn_on);
        assert_eq!(settings.contacts, vec!["kitchen_door".to_string()]);

        let inputs = light.router_inputs().unwrap();
        assert_eq!(inputs.names, vec!["light.kitchen", "kitchen_light"]);
        assert_eq!(inputs.switches.len(), 2);
        assert_eq!(inputs.switches["hue_dimmer"], SwitchProfile::PhilipsBind);
        assert_eq!(
            inputs.motion_sensors["kitchen_motion"],
            MotionInput {
                field: "presence".to_string(),
                true_value: Some(serde_json::json!(1)),
            }
        );
        let gate = inputs.auto_on_gate.unwrap();
        assert_eq!(gate.field, "state");
        assert_eq!(gate.true_value, serde_json::json!("ON"));
        assert_eq!(inputs.events["remote"][0].action, Action::ForceTurnOn);
        assert_eq!(inputs.events["remote"][0].field, "action");
    }

    #[test]
    fn should_honor_custom_cold_window() {
        let json = r#"{"lights": [{"name": "l", "cold_scene_time": {"start": "08:00", "end": "17:00"}}]}"#;
        let config = Config::from_json(json).unwrap();
        let window = config.lights[0].controller_settings().cold_window.unwrap();
        assert_eq!(window.to_string(), "08:00:00-17:00:00");
    }

    #[test]
    fn should_reject_unknown_switch_type() {
        let json = r#"{"lights": [{"name": "l", "switches": [{"name": "s", "type": "ikea"}]}]}"#;
        let err = Config::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSwitchType(ref t) if t == "ikea"));
    }

    #[test]
    fn should_reject_missing_lights() {
        assert!(matches!(
            Config::from_json(r#"{"lights": []}"#),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(Config::from_json("{}"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn should_reject_negative_durations() {
        let json = r#"{"lights": [{"name": "l", "motion_timeout": -5}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Json(_))));
        let json = r#"{"lights": [{"name": "l", "debounce": -0.5}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_bad_times() {
        let json = r#"{"lights": [{"name": "l", "warm_scene_time": {"start": "late", "end": "22:00"}}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Json(_))));
        let json = r#"{"lights": [{"name": "l", "cold_scene_time": "sometimes"}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Json(_))));
    }

    #[test]
    fn should_reject_duplicate_and_empty_names() {
        let json = r#"{"lights": [{"name": "l"}, {"name": "l"}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
        let json = r#"{"lights": [{"name": ""}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
        let json = r#"{"lights": [{"name": "l", "contacts": [{"name": ""}]}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_bad_events() {
        let json = r#"{"lights": [{"name": "l", "events": [{"name": "r", "value": 1, "action": "dance"}]}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
        let json = r#"{"lights": [{"name": "l", "events": [{"name": "r", "value": 1, "action": "set_scene", "scene": "Party"}]}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
        let json = r#"{"lights": [{"name": "l", "events": [{"name": "r", "value": 1, "action": "turn_on", "transition": -1}]}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_keep_fractional_event_transition() {
        let json = r#"{"lights": [{"name": "l", "events": [{"name": "r", "value": 1, "action": "turn_on", "transition": 1.5}]}]}"#;
        let config = Config::from_json(json).unwrap();
        let inputs = config.lights[0].router_inputs().unwrap();
        assert!((inputs.events["r"][0].transition - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reject_out_of_range_values() {
        let json = r#"{"lights": [{"name": "l", "scene_warm": {"color_temp": 5000}}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
        let json = r#"{"lights": [{"name": "l", "color_temp_support": false, "scene_warm": {"color_temp": 5000}}]}"#;
        assert!(Config::from_json(json).is_ok());
        let json = r#"{"location": {"latitude": 91.0, "longitude": 0.0}, "lights": [{"name": "l"}]}"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_apply_overrides() {
        let mut config = Config::from_json(MINIMAL).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("SCENECTL_MQTT_URL", "mqtt://10.0.0.2:1883"),
            ("SCENECTL_MQTT_USERNAME", "scenectl"),
            ("SCENECTL_MQTT_PASSWORD", "secret"),
            ("RUST_LOG", "scenectl=debug"),
        ]);
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.mqtt.url, "mqtt://10.0.0.2:1883");
        assert_eq!(config.mqtt.username.as_deref(), Some("scenectl"));
        assert_eq!(config.mqtt.password.as_deref(), Some("secret"));
        assert_eq!(config.log_level, "scenectl=debug");
    }

    #[test]
    fn should_report_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/scenectl.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
