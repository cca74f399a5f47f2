use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use formbridge_config::BridgeConfig;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::error::ServiceError;
use crate::key::ServiceKey;
use crate::message::{MessageService, MessageSink, TracingMessageSink};
use crate::query::QueryService;

/// A resolved service, one variant per supported key.
///
/// The key set is closed: resolution is a compile-time dispatch table over
/// this union, not an open-ended dynamic loader.
#[derive(Clone)]
pub enum ServiceHandle {
  Db(Arc<QueryService>),
  Messages(Arc<MessageService>),
}

impl std::fmt::Debug for ServiceHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ServiceHandle::Db(_) => f.write_str("Db"),
      ServiceHandle::Messages(_) => f.write_str("Messages"),
    }
  }
}

impl ServiceHandle {
  pub fn key(&self) -> ServiceKey {
    match self {
      ServiceHandle::Db(_) => ServiceKey::Db,
      ServiceHandle::Messages(_) => ServiceKey::Messages,
    }
  }

  pub fn as_query(&self) -> Option<&Arc<QueryService>> {
    match self {
      ServiceHandle::Db(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_messages(&self) -> Option<&Arc<MessageService>> {
    match self {
      ServiceHandle::Messages(s) => Some(s),
      _ => None,
    }
  }
}

/// Process-wide registry resolving library keys to service instances.
///
/// Shared by all sessions. First-time construction per key is serialized:
/// concurrent first callers share the in-flight construction instead of each
/// opening their own expensive resource. A construction failure does not
/// poison the cache — the next call retries.
pub struct ServiceRegistry {
  config: BridgeConfig,
  sink: Arc<dyn MessageSink>,
  query_services: Mutex<HashMap<String, Arc<OnceCell<Arc<QueryService>>>>>,
  message_service: OnceLock<Arc<MessageService>>,
}

impl ServiceRegistry {
  /// Create a registry with the default tracing message sink.
  pub fn new(config: BridgeConfig) -> Self {
    Self::with_message_sink(config, Arc::new(TracingMessageSink))
  }

  /// Create a registry that delivers messages to the given sink.
  pub fn with_message_sink(config: BridgeConfig, sink: Arc<dyn MessageSink>) -> Self {
    Self {
      config,
      sink,
      query_services: Mutex::new(HashMap::new()),
      message_service: OnceLock::new(),
    }
  }

  /// Resolve a string key, as scripts do: `load_script("db")`.
  pub async fn load_script(&self, key: &str) -> Result<ServiceHandle, ServiceError> {
    self.load(ServiceKey::from_str(key)?).await
  }

  /// Resolve a key from the closed set.
  pub async fn load(&self, key: ServiceKey) -> Result<ServiceHandle, ServiceError> {
    match key {
      ServiceKey::Db => Ok(ServiceHandle::Db(self.query_service().await?)),
      ServiceKey::Messages => Ok(ServiceHandle::Messages(self.message_service())),
    }
  }

  /// Query service over the configured default connection.
  pub async fn query_service(&self) -> Result<Arc<QueryService>, ServiceError> {
    let name = self
      .config
      .default_connection
      .clone()
      .ok_or(ServiceError::NoDefaultConnection)?;
    self.query_service_named(&name).await
  }

  /// Query service over a named connection.
  ///
  /// Single-flight per name: the cell is fetched (or created) under the map
  /// lock, but construction itself runs outside it, shared by all waiters.
  pub async fn query_service_named(&self, name: &str) -> Result<Arc<QueryService>, ServiceError> {
    let connection =
      self
        .config
        .connection(name)
        .cloned()
        .ok_or_else(|| ServiceError::UnknownConnection {
          name: name.to_string(),
        })?;

    let cell = {
      let mut services = self.query_services.lock().await;
      services
        .entry(name.to_string())
        .or_insert_with(|| Arc::new(OnceCell::new()))
        .clone()
    };

    let service = cell
      .get_or_try_init(|| async {
        debug!(connection = name, "constructing query service");
        QueryService::connect(name, &connection).await.map(Arc::new)
      })
      .await?;

    Ok(service.clone())
  }

  /// The message service. Construction is infallible.
  pub fn message_service(&self) -> Arc<MessageService> {
    self
      .message_service
      .get_or_init(|| Arc::new(MessageService::new(self.sink.clone())))
      .clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use formbridge_config::ConnectionConfig;

  fn config_with_memory_db() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.connections.insert(
      "main".to_string(),
      ConnectionConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
      },
    );
    config.default_connection = Some("main".to_string());
    config
  }

  #[tokio::test]
  async fn unknown_key_fails() {
    let registry = ServiceRegistry::new(BridgeConfig::default());
    let err = registry.load_script("widgets").await.unwrap_err();
    assert!(matches!(err, ServiceError::UnknownServiceKey { .. }));
  }

  #[tokio::test]
  async fn db_resolution_is_idempotent() {
    let registry = ServiceRegistry::new(config_with_memory_db());

    let first = registry.load_script("db").await.unwrap();
    let second = registry.load_script("db").await.unwrap();

    let (a, b) = (first.as_query().unwrap(), second.as_query().unwrap());
    // Same underlying instance, hence behaviorally identical.
    assert!(Arc::ptr_eq(a, b));

    a.update("CREATE TABLE t (x INTEGER)").await.unwrap();
    b.update("INSERT INTO t (x) VALUES (7)").await.unwrap();
    let rows = a.query_rows("SELECT x FROM t").await.unwrap();
    assert_eq!(rows[0]["x"], serde_json::Value::from(7));
  }

  #[tokio::test]
  async fn concurrent_first_loads_share_construction() {
    let registry = Arc::new(ServiceRegistry::new(config_with_memory_db()));

    let tasks: Vec<_> = (0..8)
      .map(|_| {
        let registry = registry.clone();
        tokio::spawn(async move { registry.query_service().await.unwrap() })
      })
      .collect();

    let mut services = Vec::new();
    for task in tasks {
      services.push(task.await.unwrap());
    }
    for service in &services[1..] {
      assert!(Arc::ptr_eq(&services[0], service));
    }
  }

  #[tokio::test]
  async fn failed_construction_does_not_poison_cache() {
    let mut config = BridgeConfig::default();
    config.connections.insert(
      "broken".to_string(),
      ConnectionConfig::new("sqlite:/nonexistent/dir/forms.db"),
    );
    config.default_connection = Some("broken".to_string());
    let registry = ServiceRegistry::new(config);

    // Both calls get the initialization error; the second proves the cell
    // was not poisoned by the first failure.
    for _ in 0..2 {
      let err = registry.query_service().await.unwrap_err();
      assert!(matches!(err, ServiceError::Initialization { .. }));
    }
  }

  #[tokio::test]
  async fn db_without_default_connection_fails() {
    let registry = ServiceRegistry::new(BridgeConfig::default());
    let err = registry.load(ServiceKey::Db).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoDefaultConnection));
  }

  #[tokio::test]
  async fn unknown_connection_name_fails() {
    let registry = ServiceRegistry::new(config_with_memory_db());
    let err = registry.query_service_named("other").await.unwrap_err();
    assert!(matches!(err, ServiceError::UnknownConnection { name } if name == "other"));
  }

  #[tokio::test]
  async fn messages_resolves_to_one_instance() {
    let registry = ServiceRegistry::new(BridgeConfig::default());
    let first = registry.load_script("messages").await.unwrap();
    let second = registry.load_script("messages").await.unwrap();
    assert!(Arc::ptr_eq(
      first.as_messages().unwrap(),
      second.as_messages().unwrap()
    ));
    assert_eq!(first.key(), ServiceKey::Messages);
  }
}
