//! Data models module
//!
//! Defines the daemon configuration vocabulary:
//! - ConfigProperty: the fixed set of settings the pane can edit
//! - ConfigValue: a typed property value as it travels on the wire
//! - ConfigSnapshot: the daemon's configuration as last fetched

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::UNSET_PLACEHOLDER;


/// Value kind declared by each property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Text,
    Bool,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Text => "string",
            ValueKind::Bool => "boolean",
        }
    }
}

/// Errors produced while turning user or daemon input into typed values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("unknown config property '{0}'")]
    UnknownProperty(String),

    #[error("invalid value '{value}' for {property}: expected {expected}")]
    InvalidValue {
        property: ConfigProperty,
        value: String,
        expected: &'static str,
    },
}

/// One of the daemon settings exposed by the preferences pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigProperty {
    Cpus,
    Memory,
    DiskSize,
    HttpProxy,
    HttpsProxy,
    NoProxy,
    ProxyCaFile,
    PullSecretFile,
    Nameserver,
    ConsentTelemetry,
    AutostartTray,
}

impl ConfigProperty {
    /// Every property, in display order
    pub const ALL: [ConfigProperty; 11] = [
        ConfigProperty::Cpus,
        ConfigProperty::Memory,
        ConfigProperty::DiskSize,
        ConfigProperty::HttpProxy,
        ConfigProperty::HttpsProxy,
        ConfigProperty::NoProxy,
        ConfigProperty::ProxyCaFile,
        ConfigProperty::PullSecretFile,
        ConfigProperty::Nameserver,
        ConfigProperty::ConsentTelemetry,
        ConfigProperty::AutostartTray,
    ];

    /// Name used by the daemon's config store
    pub fn name(&self) -> &'static str {
        match self {
            ConfigProperty::Cpus => "cpus",
            ConfigProperty::Memory => "memory",
            ConfigProperty::DiskSize => "disk-size",
            ConfigProperty::HttpProxy => "http-proxy",
            ConfigProperty::HttpsProxy => "https-proxy",
            ConfigProperty::NoProxy => "no-proxy",
            ConfigProperty::ProxyCaFile => "proxy-ca-file",
            ConfigProperty::PullSecretFile => "pull-secret-file",
            ConfigProperty::Nameserver => "nameserver",
            ConfigProperty::ConsentTelemetry => "consent-telemetry",
            ConfigProperty::AutostartTray => "autostart-tray",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigProperty::Cpus | ConfigProperty::Memory | ConfigProperty::DiskSize => {
                ValueKind::Integer
            }
            ConfigProperty::AutostartTray => ValueKind::Bool,
            _ => ValueKind::Text,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ValueError> {
        Self::ALL
            .iter()
            .copied()
            .find(|property| property.name() == name)
            .ok_or_else(|| ValueError::UnknownProperty(name.to_string()))
    }

    /// Parse raw widget/command-line text according to this property's kind.
    ///
    /// Text properties accept anything, including the empty string which
    /// the planner turns into an unset.
    pub fn parse_value(&self, raw: &str) -> Result<ConfigValue, ValueError> {
        let invalid = || ValueError::InvalidValue {
            property: *self,
            value: raw.to_string(),
            expected: self.kind().as_str(),
        };

        match self.kind() {
            ValueKind::Integer => raw.trim().parse::<i64>().map(ConfigValue::Integer).map_err(|_| invalid()),
            ValueKind::Bool => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(ConfigValue::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(ConfigValue::Bool(false)),
                _ => Err(invalid()),
            },
            ValueKind::Text => Ok(ConfigValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for ConfigProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigProperty {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl Serialize for ConfigProperty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ConfigProperty {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

/// A property value, serialized as a bare JSON scalar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Integer(i64),
    Bool(bool),
    Text(String),
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Integer(_) => ValueKind::Integer,
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Text(_) => ValueKind::Text,
        }
    }

    /// True for the "edited to empty" marker of string fields
    pub fn is_empty_text(&self) -> bool {
        matches!(self, ConfigValue::Text(text) if text.is_empty())
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Integer(value) => write!(f, "{}", value),
            ConfigValue::Bool(value) => write!(f, "{}", value),
            ConfigValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

/// The daemon's configuration as of the last fetch.
///
/// Replaced wholesale on every reload; a property missing from the map is
/// unset on the daemon side and uses its default there.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    values: BTreeMap<ConfigProperty, ConfigValue>,
}

impl ConfigSnapshot {
    pub fn new(values: BTreeMap<ConfigProperty, ConfigValue>) -> Self {
        Self { values }
    }

    /// Build a snapshot from the daemon's flat `name -> value` map.
    ///
    /// Unknown names and values of the wrong JSON type are skipped; they
    /// come back as the second element so the caller can log them.
    pub fn from_daemon_map(raw: &serde_json::Map<String, serde_json::Value>) -> (Self, Vec<String>) {
        let mut values = BTreeMap::new();
        let mut skipped = Vec::new();

        for (name, value) in raw {
            let Ok(property) = ConfigProperty::from_name(name) else {
                skipped.push(name.clone());
                continue;
            };

            let typed = match (property.kind(), value) {
                (ValueKind::Integer, serde_json::Value::Number(n)) => n.as_i64().map(ConfigValue::Integer),
                (ValueKind::Bool, serde_json::Value::Bool(b)) => Some(ConfigValue::Bool(*b)),
                (ValueKind::Text, serde_json::Value::String(s)) => Some(ConfigValue::Text(s.clone())),
                (_, serde_json::Value::Null) => None,
                _ => {
                    skipped.push(name.clone());
                    None
                }
            };

            if let Some(typed) = typed {
                values.insert(property, typed);
            }
        }

        (Self { values }, skipped)
    }

    pub fn get(&self, property: ConfigProperty) -> Option<&ConfigValue> {
        self.values.get(&property)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConfigProperty, &ConfigValue)> {
        self.values.iter().map(|(property, value)| (*property, value))
    }

    /// Text shown in the pane's control for `property`
    pub fn display_value(&self, property: ConfigProperty) -> String {
        if property == ConfigProperty::ConsentTelemetry {
            return on_off(self.telemetry_consent()).to_string();
        }

        match (self.get(property), property.kind()) {
            (Some(value), _) => value.to_string(),
            (None, ValueKind::Text) => UNSET_PLACEHOLDER.to_string(),
            (None, ValueKind::Integer) => "0".to_string(),
            (None, ValueKind::Bool) => on_off(false).to_string(),
        }
    }

    /// Consent switch state: on only for a case-insensitive "yes"
    pub fn telemetry_consent(&self) -> bool {
        matches!(
            self.get(ConfigProperty::ConsentTelemetry),
            Some(ConfigValue::Text(text)) if text.eq_ignore_ascii_case("yes")
        )
    }

    /// Autostart switch state, `None` when the daemon reports nothing
    pub fn autostart(&self) -> Option<bool> {
        match self.get(ConfigProperty::AutostartTray) {
            Some(ConfigValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
