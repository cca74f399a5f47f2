//! Per-concern capability interfaces composed by the facade.
//!
//! The script-facing surface is wide; splitting it by concern keeps each
//! capability boundary explicit and independently testable. A host that
//! hands a script only field access can take `&dyn FieldAccess`.

use std::collections::HashMap;
use std::time::Duration;

use formbridge_session::{Field, FieldValue, ValidatorOutcome};
use formbridge_timer::{TimerCallback, TimerHandle};

use crate::error::FacadeError;

/// Reading and mutating session field state.
pub trait FieldAccess {
  /// Look up a field. Absence is an expected outcome, not an error.
  fn field(&self, field_id: &str) -> Option<Field>;

  fn set_field_value(&self, field_id: &str, value: FieldValue) -> Result<(), FacadeError>;

  /// Field ids in registration order, stable within the session.
  fn field_ids(&self) -> Vec<String>;

  fn is_field_modified(&self, field_id: &str) -> bool;

  /// Ids of all fields whose current value differs from the committed one.
  fn modified_fields(&self) -> Vec<String>;

  fn is_form_modified(&self) -> bool;

  /// Current values of all fields.
  fn form_data(&self) -> HashMap<String, FieldValue>;

  /// Commit every field atomically and return the committed data.
  fn commit_and_get_form_data(&self) -> Result<HashMap<String, FieldValue>, FacadeError>;
}

/// Action gates and session teardown.
pub trait SessionControl {
  fn set_save_enabled(&self, enabled: bool);
  fn is_save_enabled(&self) -> bool;
  fn set_finish_enabled(&self, enabled: bool);
  fn is_finish_enabled(&self) -> bool;
  fn set_cancel_enabled(&self, enabled: bool);
  fn is_cancel_enabled(&self) -> bool;

  /// Request session teardown.
  ///
  /// A non-forced close consults the close policy and returns `false` when
  /// blocked. A forced close always tears down: all live timers are
  /// cancelled before any engine-side resource is released. Returns `true`
  /// iff teardown completed.
  fn close(&self, force: bool) -> bool;
}

/// Session-scoped key/value variables.
pub trait GlobalVariables {
  fn set_global_variable(&self, key: &str, value: serde_json::Value);
  fn global_variable(&self, key: &str) -> Option<serde_json::Value>;
  fn is_global_variable_set(&self, key: &str) -> bool;
  fn unset_global_variable(&self, key: &str);
}

/// Validation policy and pull-based validity.
pub trait Validation {
  fn set_strict_mode(&self, strict: bool);
  fn is_strict_mode(&self) -> bool;

  /// Recompute the aggregate validity against current field values.
  fn is_valid(&self) -> bool;

  fn validator_ids(&self) -> Vec<String>;
  fn validator_outcomes(&self) -> Vec<(String, ValidatorOutcome)>;
}

/// Session-bound timers.
pub trait Timers {
  /// Run `callback` once after `delay`.
  fn register_timer_command(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

  /// Run `callback` every `period`, strictly ordered and non-overlapping.
  fn register_repeating_timer(&self, period: Duration, callback: TimerCallback) -> TimerHandle;
}
