//! Formbridge Config
//!
//! This crate contains the serializable configuration types for formbridge.
//! These types describe how an embedding host wires up the bridge: which
//! named database connections the query service may open, and which flags a
//! freshly opened form session starts with.
//!
//! Configuration can be loaded from:
//! - JSON files shipped alongside the host deployment
//! - Database storage (as JSON blobs)
//!
//! The host hands these types to the service registry and session factory;
//! the bridge never reads configuration from disk on its own.

mod connection;
mod defaults;
mod error;

pub use connection::ConnectionConfig;
pub use defaults::SessionDefaults;
pub use error::ConfigError;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
  /// Named database connections available to the query service.
  /// The key is the connection name scripts pass when requesting the
  /// `"db"` service.
  #[serde(default)]
  pub connections: HashMap<String, ConnectionConfig>,

  /// Connection name used when a script does not name one explicitly.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_connection: Option<String>,

  /// Initial flags for newly opened sessions.
  #[serde(default)]
  pub session_defaults: SessionDefaults,
}

impl BridgeConfig {
  /// Parse a configuration from a JSON string.
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    let config: BridgeConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  /// Look up a named connection.
  pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
    self.connections.get(name)
  }

  /// Check internal consistency (the default connection must exist).
  pub fn validate(&self) -> Result<(), ConfigError> {
    if let Some(name) = &self.default_connection
      && !self.connections.contains_key(name)
    {
      return Err(ConfigError::UnknownDefaultConnection { name: name.clone() });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_minimal_config() {
    let config = BridgeConfig::from_json("{}").unwrap();
    assert!(config.connections.is_empty());
    assert!(config.default_connection.is_none());
    assert!(config.session_defaults.cancel_enabled);
  }

  #[test]
  fn parse_full_config() {
    let json = r#"{
      "connections": {
        "main": { "url": "sqlite::memory:", "max_connections": 4 }
      },
      "default_connection": "main",
      "session_defaults": { "strict_mode": true, "save_enabled": false }
    }"#;
    let config = BridgeConfig::from_json(json).unwrap();
    assert_eq!(config.connection("main").unwrap().url, "sqlite::memory:");
    assert!(config.session_defaults.strict_mode);
    assert!(!config.session_defaults.save_enabled);
  }

  #[test]
  fn default_connection_must_exist() {
    let json = r#"{ "default_connection": "missing" }"#;
    let err = BridgeConfig::from_json(json).unwrap_err();
    assert!(matches!(
      err,
      ConfigError::UnknownDefaultConnection { name } if name == "missing"
    ));
  }
}
