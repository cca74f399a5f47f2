use thiserror::Error;

/// Errors surfaced to scripts by the service registry and its services.
#[derive(Debug, Error)]
pub enum ServiceError {
  /// The key is outside the closed set. A programming error in the script.
  #[error("unknown service key '{key}' (supported: db, messages)")]
  UnknownServiceKey { key: String },

  /// The requested connection name is not configured.
  #[error("connection '{name}' is not configured")]
  UnknownConnection { name: String },

  /// The `db` key was requested but no default connection is configured.
  #[error("no default connection configured")]
  NoDefaultConnection,

  /// Service construction failed, e.g. the database could not be opened.
  /// Not cached; a later load may retry.
  #[error("failed to initialize service over connection '{name}'")]
  Initialization {
    name: String,
    #[source]
    source: sqlx::Error,
  },

  /// A query or update failed downstream.
  #[error("query failed: {0}")]
  Query(#[from] sqlx::Error),
}
