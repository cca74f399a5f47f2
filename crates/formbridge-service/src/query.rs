use formbridge_config::ConnectionConfig;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo};
use tracing::debug;

use crate::error::ServiceError;

/// Database query service behind the `"db"` registry key.
///
/// Queries are raw SQL strings; the caller owns injection safety, matching
/// the script-facing contract. The pool is scoped to the connection name,
/// never shared mutable state between sessions.
#[derive(Debug)]
pub struct QueryService {
  connection_name: String,
  pool: SqlitePool,
}

impl QueryService {
  /// Open a pool for the named connection.
  pub async fn connect(name: &str, config: &ConnectionConfig) -> Result<Self, ServiceError> {
    let mut options = SqlitePoolOptions::new();
    if let Some(max) = config.max_connections {
      options = options.max_connections(max);
    }

    let pool = options
      .connect(&config.url)
      .await
      .map_err(|e| ServiceError::Initialization {
        name: name.to_string(),
        source: e,
      })?;

    debug!(connection = name, url = %config.url, "query service connected");
    Ok(Self {
      connection_name: name.to_string(),
      pool,
    })
  }

  pub fn connection_name(&self) -> &str {
    &self.connection_name
  }

  /// Run a SELECT and return all rows as JSON objects keyed by column name.
  pub async fn query_rows(&self, query: &str) -> Result<Vec<Map<String, Value>>, ServiceError> {
    let rows = sqlx::query(query).fetch_all(&self.pool).await?;
    rows.iter().map(row_to_json).collect()
  }

  /// Run a statement that returns no rows. Returns the affected row count.
  pub async fn update(&self, query: &str) -> Result<u64, ServiceError> {
    let result = sqlx::query(query).execute(&self.pool).await?;
    Ok(result.rows_affected())
  }
}

/// Convert one SQLite row into a JSON object, by declared column type.
fn row_to_json(row: &SqliteRow) -> Result<Map<String, Value>, ServiceError> {
  let mut object = Map::new();
  for (i, column) in row.columns().iter().enumerate() {
    let value = match column.type_info().name() {
      "NULL" => Value::Null,
      "INTEGER" | "BOOLEAN" => row
        .try_get::<Option<i64>, _>(i)?
        .map(Value::from)
        .unwrap_or(Value::Null),
      "REAL" => row
        .try_get::<Option<f64>, _>(i)?
        .map(Value::from)
        .unwrap_or(Value::Null),
      "BLOB" => row
        .try_get::<Option<Vec<u8>>, _>(i)?
        .map(|bytes| Value::Array(bytes.into_iter().map(Value::from).collect()))
        .unwrap_or(Value::Null),
      // TEXT, DATETIME and anything else SQLite reports read as text.
      _ => row
        .try_get::<Option<String>, _>(i)?
        .map(Value::String)
        .unwrap_or(Value::Null),
    };
    object.insert(column.name().to_string(), value);
  }
  Ok(object)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn memory_config() -> ConnectionConfig {
    // A single connection so every statement sees the same in-memory db.
    ConnectionConfig {
      url: "sqlite::memory:".to_string(),
      max_connections: Some(1),
    }
  }

  #[tokio::test]
  async fn update_then_query_round_trip() {
    let service = QueryService::connect("main", &memory_config()).await.unwrap();

    service
      .update("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
      .await
      .unwrap();
    let affected = service
      .update("INSERT INTO users (name, score) VALUES ('ada', 9.5), ('grace', NULL)")
      .await
      .unwrap();
    assert_eq!(affected, 2);

    let rows = service
      .query_rows("SELECT id, name, score FROM users ORDER BY id")
      .await
      .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], Value::String("ada".to_string()));
    assert_eq!(rows[0]["score"], Value::from(9.5));
    assert_eq!(rows[1]["score"], Value::Null);
  }

  #[tokio::test]
  async fn invalid_sql_surfaces_query_error() {
    let service = QueryService::connect("main", &memory_config()).await.unwrap();
    let err = service.query_rows("SELECT * FROM missing").await.unwrap_err();
    assert!(matches!(err, ServiceError::Query(_)));
  }

  #[tokio::test]
  async fn unreachable_database_fails_initialization() {
    let config = ConnectionConfig::new("sqlite:/nonexistent/dir/forms.db");
    let err = QueryService::connect("broken", &config).await.unwrap_err();
    assert!(matches!(
      err,
      ServiceError::Initialization { name, .. } if name == "broken"
    ));
  }
}
