use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The configuration JSON could not be parsed.
  #[error("invalid configuration: {0}")]
  Parse(#[from] serde_json::Error),

  /// `default_connection` names a connection that is not configured.
  #[error("default connection '{name}' is not configured")]
  UnknownDefaultConnection { name: String },
}
