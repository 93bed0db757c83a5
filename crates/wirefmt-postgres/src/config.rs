//! Codec context configuration.
//!
//! Provides the initial zone, charset, locale and settings of a
//! [`BasicContext`](crate::BasicContext), either through the builder methods
//! or loaded from JSON.

use std::collections::HashMap;

use serde::Deserialize;
use wirefmt_core::{ConfigError, Error, Result};

use crate::context::settings::{DateTimeEncoding, FIELD_DATETIME_FORMAT};

/// Initial configuration of a codec context.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Session time zone id (`UTC`, `+05:30`, `Etc/GMT+5`)
    pub time_zone: String,
    /// Client character set name
    pub client_encoding: String,
    /// Symbol printed by the currency formatter
    pub currency_symbol: String,
    /// Named settings read by codecs
    pub settings: HashMap<String, String>,
    /// User type names mapped to host type names
    pub custom_types: HashMap<String, String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            client_encoding: "UTF8".to_string(),
            currency_symbol: "$".to_string(),
            settings: HashMap::new(),
            custom_types: HashMap::new(),
        }
    }
}

impl ContextConfig {
    /// Create a configuration with defaults: UTC, UTF8, `$`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```rust,ignore
    /// let config = ContextConfig::from_json(r#"{"time_zone": "+02:00"}"#)?;
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::Config(ConfigError {
                setting: None,
                message: format!("invalid context configuration: {e}"),
                source: Some(Box::new(e)),
            })
        })
    }

    /// Set the session time zone id.
    pub fn time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = zone.into();
        self
    }

    /// Set the client character set.
    pub fn client_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.client_encoding = encoding.into();
        self
    }

    /// Set the currency symbol.
    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Set the binary date/time encoding.
    pub fn datetime_encoding(self, encoding: DateTimeEncoding) -> Self {
        self.setting(FIELD_DATETIME_FORMAT.name(), encoding.as_str())
    }

    /// Set a named setting.
    pub fn setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Map a user type name to a host type name.
    pub fn custom_type(mut self, type_name: impl Into<String>, host_type: impl Into<String>) -> Self {
        self.custom_types.insert(type_name.into(), host_type.into());
        self
    }

    /// Startup parameters that make the server's text output match this
    /// configuration.
    pub fn startup_params(&self) -> Vec<(String, String)> {
        vec![
            ("client_encoding".to_string(), self.client_encoding.clone()),
            ("DateStyle".to_string(), "ISO, MDY".to_string()),
            ("TimeZone".to_string(), self.time_zone.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ContextConfig::new()
            .time_zone("+09:00")
            .client_encoding("LATIN1")
            .currency_symbol("€")
            .datetime_encoding(DateTimeEncoding::Float)
            .setting("app.mode", "strict")
            .custom_type("inventory_item", "InventoryItem");

        assert_eq!(config.time_zone, "+09:00");
        assert_eq!(config.client_encoding, "LATIN1");
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(
            config.settings.get("field.datetime.format"),
            Some(&"float".to_string())
        );
        assert_eq!(config.settings.get("app.mode"), Some(&"strict".to_string()));
        assert_eq!(
            config.custom_types.get("inventory_item"),
            Some(&"InventoryItem".to_string())
        );
    }

    #[test]
    fn test_from_json_defaults() {
        let config = ContextConfig::from_json(r#"{"time_zone": "Etc/GMT+3"}"#).unwrap();
        assert_eq!(config.time_zone, "Etc/GMT+3");
        assert_eq!(config.client_encoding, "UTF8");
        assert_eq!(config.currency_symbol, "$");
        assert!(config.settings.is_empty());
    }

    #[test]
    fn test_from_json_settings() {
        let config = ContextConfig::from_json(
            r#"{"settings": {"field.datetime.format": "float"}, "custom_types": {"a": "B"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.settings.get("field.datetime.format").map(String::as_str),
            Some("float")
        );
        assert_eq!(config.custom_types.get("a").map(String::as_str), Some("B"));
    }

    #[test]
    fn test_from_json_error() {
        let err = ContextConfig::from_json(r#"{"time_zone": 5}"#).unwrap_err();
        assert!(err.is_config_error());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_startup_params() {
        let params = ContextConfig::new().time_zone("+01:00").startup_params();
        assert!(params.iter().any(|(k, v)| k == "TimeZone" && v == "+01:00"));
        assert!(
            params
                .iter()
                .any(|(k, v)| k == "client_encoding" && v == "UTF8")
        );
        assert!(params.iter().any(|(k, v)| k == "DateStyle" && v.starts_with("ISO")));
    }
}
