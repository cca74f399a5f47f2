use serde::{Deserialize, Serialize};

/// A named database connection the query service may open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
  /// Connection URL, e.g. "sqlite:forms.db" or "sqlite::memory:".
  pub url: String,

  /// Maximum pool size. Uses the driver default when unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_connections: Option<u32>,
}

impl ConnectionConfig {
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      max_connections: None,
    }
  }
}
