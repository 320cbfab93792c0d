//! Broker settings
//!
//! Operator configuration as an explicit key/value store. Keys follow the
//! `service.<name>.<suffix>` convention; see [`service_property`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::overlay::ValueMap;

/// Suffix of the per-service enable flag.
pub const ENABLED_SUFFIX: &str = "enabled";
/// Suffix of the full service definition override.
pub const DEFINITION_SUFFIX: &str = "definition";
/// Suffix of the operator-defined plan list.
pub const PLANS_SUFFIX: &str = "plans";
/// Suffix of the role whitelist.
pub const WHITELIST_SUFFIX: &str = "whitelist";
/// Suffix of the operator provision defaults overlay.
pub const PROVISION_DEFAULTS_SUFFIX: &str = "provision.defaults";

/// Builds a per-service setting key: `service.<name>.<suffix>`.
#[must_use]
pub fn service_property(service_name: &str, suffix: &str) -> String {
    format!("service.{service_name}.{suffix}")
}

/// Operator-supplied settings, passed explicitly to every call that needs them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerSettings {
    values: ValueMap,
}

impl BrokerSettings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates settings from an existing map.
    #[must_use]
    pub const fn from_map(values: ValueMap) -> Self {
        Self { values }
    }

    /// Sets a value, returning the settings for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value. Setting `null` removes the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        match value.into() {
            Value::Null => {
                self.values.remove(&key);
            }
            value => {
                self.values.insert(key, value);
            }
        }
    }

    /// Gets a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Gets a value as text. Non-string scalars are rendered as JSON.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Gets a boolean flag, accepting `true`/`false` strings as well.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_service_property_format() {
        assert_eq!(
            service_property("left-handed-smoke-sifter", ENABLED_SUFFIX),
            "service.left-handed-smoke-sifter.enabled"
        );
        assert_eq!(
            service_property("my-service", PROVISION_DEFAULTS_SUFFIX),
            "service.my-service.provision.defaults"
        );
    }

    #[test]
    fn test_typed_getters() {
        let settings = BrokerSettings::new()
            .with("flag", true)
            .with("flag_str", "false")
            .with("text", "x,y,z")
            .with("number", 3);

        assert_eq!(settings.get_bool("flag"), Some(true));
        assert_eq!(settings.get_bool("flag_str"), Some(false));
        assert_eq!(settings.get_bool("text"), None);
        assert_eq!(settings.get_str("text").as_deref(), Some("x,y,z"));
        assert_eq!(settings.get_str("number").as_deref(), Some("3"));
        assert_eq!(settings.get_str("missing"), None);
    }

    #[test]
    fn test_setting_null_removes() {
        let mut settings = BrokerSettings::new().with("key", "value");
        settings.set("key", Value::Null);
        assert_eq!(settings.get("key"), None);
    }

    #[test]
    fn test_deserializes_from_flat_json() {
        let settings: BrokerSettings =
            serde_json::from_str(r#"{"service.a.enabled": false}"#).unwrap();
        assert_eq!(settings.get_bool("service.a.enabled"), Some(false));
    }
}
