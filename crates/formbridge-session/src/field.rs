use std::collections::HashMap;

use crate::error::SessionError;
use crate::value::FieldValue;

/// One form field: current value plus the last committed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
  id: String,
  current: FieldValue,
  committed: FieldValue,
}

impl Field {
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn current(&self) -> &FieldValue {
    &self.current
  }

  pub fn committed(&self) -> &FieldValue {
    &self.committed
  }

  /// A field is modified exactly when current and committed values differ.
  pub fn is_modified(&self) -> bool {
    self.current != self.committed
  }
}

/// Holds the fields of one form session.
///
/// Fields are kept in registration order, which is the order the form
/// definition declared them in; `field_ids` iterates in that order and is
/// stable for the session's lifetime.
#[derive(Debug, Default)]
pub struct FieldStore {
  order: Vec<String>,
  fields: HashMap<String, Field>,
}

impl FieldStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a field with its initial (and committed) value.
  ///
  /// Registration happens when the host opens the task; scripts only read
  /// and mutate values afterwards.
  pub fn register(
    &mut self,
    field_id: impl Into<String>,
    initial: FieldValue,
  ) -> Result<(), SessionError> {
    let field_id = field_id.into();
    if self.fields.contains_key(&field_id) {
      return Err(SessionError::DuplicateField { field_id });
    }
    self.order.push(field_id.clone());
    self.fields.insert(
      field_id.clone(),
      Field {
        id: field_id,
        current: initial.clone(),
        committed: initial,
      },
    );
    Ok(())
  }

  /// Look up a field. Absence is an expected outcome, not an error.
  pub fn get(&self, field_id: &str) -> Option<&Field> {
    self.fields.get(field_id)
  }

  /// Set a field's current value.
  pub fn set_value(&mut self, field_id: &str, value: FieldValue) -> Result<(), SessionError> {
    let field = self
      .fields
      .get_mut(field_id)
      .ok_or_else(|| SessionError::UnknownField {
        field_id: field_id.to_string(),
      })?;
    field.current = value;
    Ok(())
  }

  /// Iterate field ids in registration order. Restartable and stable.
  pub fn field_ids(&self) -> impl Iterator<Item = &str> {
    self.order.iter().map(String::as_str)
  }

  /// Whether the named field differs from its committed value.
  ///
  /// Unknown fields read as unmodified, matching the probe-friendly
  /// semantics of the rest of the surface.
  pub fn is_modified(&self, field_id: &str) -> bool {
    self.fields.get(field_id).is_some_and(Field::is_modified)
  }

  /// Ids of all modified fields, in registration order.
  pub fn modified_fields(&self) -> Vec<String> {
    self
      .order
      .iter()
      .filter(|id| self.is_modified(id))
      .cloned()
      .collect()
  }

  /// Whether any field is modified.
  pub fn any_modified(&self) -> bool {
    self.fields.values().any(Field::is_modified)
  }

  /// Current values of all fields, keyed by field id.
  pub fn form_data(&self) -> HashMap<String, FieldValue> {
    self
      .fields
      .values()
      .map(|f| (f.id.clone(), f.current.clone()))
      .collect()
  }

  /// Commit every field's current value.
  ///
  /// Callers holding `&mut self` get the all-or-nothing guarantee for free:
  /// no reader can observe a partially committed store. Returns the
  /// committed form data.
  pub fn commit_all(&mut self) -> HashMap<String, FieldValue> {
    for field in self.fields.values_mut() {
      field.committed = field.current.clone();
    }
    self.form_data()
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store_with(ids: &[&str]) -> FieldStore {
    let mut store = FieldStore::new();
    for id in ids {
      store.register(*id, FieldValue::Null).unwrap();
    }
    store
  }

  #[test]
  fn registration_order_is_stable() {
    let store = store_with(&["c", "a", "b"]);
    let ids: Vec<_> = store.field_ids().collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    // Restartable: a second pass yields the same sequence.
    let again: Vec<_> = store.field_ids().collect();
    assert_eq!(ids, again);
  }

  #[test]
  fn duplicate_registration_rejected() {
    let mut store = store_with(&["a"]);
    let err = store.register("a", FieldValue::Null).unwrap_err();
    assert!(matches!(err, SessionError::DuplicateField { field_id } if field_id == "a"));
  }

  #[test]
  fn modification_tracks_equality() {
    let mut store = FieldStore::new();
    store.register("amount", FieldValue::Integer(10)).unwrap();
    assert!(!store.is_modified("amount"));

    store.set_value("amount", FieldValue::Integer(11)).unwrap();
    assert!(store.is_modified("amount"));

    // Setting back to the committed value clears the modification.
    store.set_value("amount", FieldValue::Number(10.0)).unwrap();
    assert!(!store.is_modified("amount"));
  }

  #[test]
  fn unknown_field_probes_are_benign() {
    let store = store_with(&["a"]);
    assert!(store.get("missing").is_none());
    assert!(!store.is_modified("missing"));
  }

  #[test]
  fn commit_clears_all_modifications() {
    let mut store = store_with(&["a", "b", "c"]);
    store.set_value("a", FieldValue::from("x")).unwrap();
    store.set_value("c", FieldValue::from(true)).unwrap();
    assert_eq!(store.modified_fields(), vec!["a", "c"]);

    let data = store.commit_all();
    assert_eq!(data.len(), 3);
    assert_eq!(data["a"], FieldValue::from("x"));
    assert!(store.modified_fields().is_empty());
    assert!(!store.any_modified());
  }

  #[test]
  fn set_value_on_unknown_field_errors() {
    let mut store = store_with(&["a"]);
    let err = store.set_value("nope", FieldValue::Null).unwrap_err();
    assert!(matches!(err, SessionError::UnknownField { .. }));
  }
}
