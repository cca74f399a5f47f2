use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;

/// The closed set of library keys scripts may load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKey {
  /// Database query service, constructed over a named connection.
  Db,
  /// Fire-and-forget user notification service.
  Messages,
}

impl ServiceKey {
  pub const ALL: [ServiceKey; 2] = [ServiceKey::Db, ServiceKey::Messages];

  pub fn as_str(&self) -> &'static str {
    match self {
      ServiceKey::Db => "db",
      ServiceKey::Messages => "messages",
    }
  }
}

impl fmt::Display for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ServiceKey {
  type Err = ServiceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "db" => Ok(ServiceKey::Db),
      "messages" => Ok(ServiceKey::Messages),
      other => Err(ServiceError::UnknownServiceKey {
        key: other.to_string(),
      }),
    }
  }
}
