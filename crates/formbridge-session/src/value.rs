use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A field value as seen by scripts.
///
/// Values are opaque to the bridge except for equality, which drives
/// modification tracking: a field is modified exactly when its current value
/// is not equal to its committed value. Each variant defines its own
/// comparison — numbers by value, dates by timeline instant, structured
/// values by JSON deep-equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
  #[default]
  Null,
  Bool(bool),
  Integer(i64),
  Number(f64),
  Text(String),
  Date(DateTime<Utc>),
  Structured(serde_json::Value),
}

impl FieldValue {
  /// Whether this value is `Null`.
  pub fn is_null(&self) -> bool {
    matches!(self, FieldValue::Null)
  }

  /// Project the value into plain JSON, losing the date/number distinction.
  ///
  /// Dates are rendered as RFC 3339 strings, matching what the host's form
  /// serializer emits.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      FieldValue::Null => serde_json::Value::Null,
      FieldValue::Bool(b) => serde_json::Value::Bool(*b),
      FieldValue::Integer(i) => serde_json::Value::from(*i),
      FieldValue::Number(n) => serde_json::Value::from(*n),
      FieldValue::Text(s) => serde_json::Value::String(s.clone()),
      FieldValue::Date(d) => serde_json::Value::String(d.to_rfc3339()),
      FieldValue::Structured(v) => v.clone(),
    }
  }
}

impl PartialEq for FieldValue {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (FieldValue::Null, FieldValue::Null) => true,
      (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
      (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
      // Mixed numeric comparison: an integer and a float holding the same
      // mathematical value compare equal, since the designer's numeric
      // widgets do not distinguish the two.
      (FieldValue::Integer(a), FieldValue::Number(b))
      | (FieldValue::Number(b), FieldValue::Integer(a)) => (*a as f64) == *b,
      (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
      (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
      (FieldValue::Date(a), FieldValue::Date(b)) => a == b,
      (FieldValue::Structured(a), FieldValue::Structured(b)) => a == b,
      _ => false,
    }
  }
}

impl From<bool> for FieldValue {
  fn from(v: bool) -> Self {
    FieldValue::Bool(v)
  }
}

impl From<i64> for FieldValue {
  fn from(v: i64) -> Self {
    FieldValue::Integer(v)
  }
}

impl From<f64> for FieldValue {
  fn from(v: f64) -> Self {
    FieldValue::Number(v)
  }
}

impl From<&str> for FieldValue {
  fn from(v: &str) -> Self {
    FieldValue::Text(v.to_string())
  }
}

impl From<String> for FieldValue {
  fn from(v: String) -> Self {
    FieldValue::Text(v)
  }
}

impl From<DateTime<Utc>> for FieldValue {
  fn from(v: DateTime<Utc>) -> Self {
    FieldValue::Date(v)
  }
}

impl From<serde_json::Value> for FieldValue {
  fn from(v: serde_json::Value) -> Self {
    FieldValue::Structured(v)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn numeric_equality_across_variants() {
    assert_eq!(FieldValue::Integer(3), FieldValue::Number(3.0));
    assert_ne!(FieldValue::Integer(3), FieldValue::Number(3.5));
    assert_ne!(FieldValue::Number(f64::NAN), FieldValue::Number(f64::NAN));
  }

  #[test]
  fn date_equality_is_instant_based() {
    let a = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let b = a.with_timezone(&chrono::FixedOffset::east_opt(3600).unwrap());
    assert_eq!(FieldValue::Date(a), FieldValue::Date(b.with_timezone(&Utc)));
  }

  #[test]
  fn structured_equality_is_deep() {
    let a = FieldValue::Structured(serde_json::json!({"rows": [1, 2, {"k": "v"}]}));
    let b = FieldValue::Structured(serde_json::json!({"rows": [1, 2, {"k": "v"}]}));
    let c = FieldValue::Structured(serde_json::json!({"rows": [1, 2, {"k": "w"}]}));
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn text_never_equals_date() {
    let d = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    assert_ne!(FieldValue::Text(d.to_rfc3339()), FieldValue::Date(d));
  }

  #[test]
  fn serde_round_trip_keeps_variant() {
    let v = FieldValue::Date(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap());
    let json = serde_json::to_string(&v).unwrap();
    let back: FieldValue = serde_json::from_str(&json).unwrap();
    assert_eq!(v, back);
  }
}
