use std::collections::HashMap;

/// Key/value scope bound to one form session.
///
/// Values live exactly as long as the session; nothing here is persisted
/// unless the host explicitly propagates it at teardown. A missing key is an
/// ordinary `None`, since scripts routinely probe for optional variables.
#[derive(Debug, Default)]
pub struct GlobalVariableStore {
  values: HashMap<String, serde_json::Value>,
}

impl GlobalVariableStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
    self.values.insert(key.into(), value);
  }

  pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
    self.values.get(key)
  }

  pub fn is_set(&self, key: &str) -> bool {
    self.values.contains_key(key)
  }

  /// Remove a variable. Removing an absent key is a no-op.
  pub fn unset(&mut self, key: &str) {
    self.values.remove(key);
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn set_get_unset_round_trip() {
    let mut globals = GlobalVariableStore::new();
    globals.set("k", json!("v"));
    assert_eq!(globals.get("k"), Some(&json!("v")));
    assert!(globals.is_set("k"));

    globals.unset("k");
    assert!(!globals.is_set("k"));
    assert_eq!(globals.get("k"), None);
  }

  #[test]
  fn unset_missing_key_is_noop() {
    let mut globals = GlobalVariableStore::new();
    globals.unset("never-set");
    assert!(globals.is_empty());
  }

  #[test]
  fn overwrite_replaces_value() {
    let mut globals = GlobalVariableStore::new();
    globals.set("k", json!(1));
    globals.set("k", json!({"nested": true}));
    assert_eq!(globals.get("k"), Some(&json!({"nested": true})));
    assert_eq!(globals.len(), 1);
  }
}
