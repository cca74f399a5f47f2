use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use formbridge_config::SessionDefaults;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::error::SessionError;
use crate::field::{Field, FieldStore};
use crate::globals::GlobalVariableStore;
use crate::validation::{ValidationState, Validator, ValidatorOutcome};
use crate::value::FieldValue;

/// Identity of one running form-task instance.
#[derive(Debug, Clone)]
pub struct SessionDescriptor {
  pub session_id: Uuid,
  pub process_instance_id: i64,
  pub task_id: String,
  pub process_definition_id: String,
  pub form_key: String,
  pub form_name: String,
  pub form_description: Option<String>,
}

impl SessionDescriptor {
  pub fn new(
    process_instance_id: i64,
    task_id: impl Into<String>,
    process_definition_id: impl Into<String>,
    form_key: impl Into<String>,
    form_name: impl Into<String>,
  ) -> Self {
    Self {
      session_id: Uuid::new_v4(),
      process_instance_id,
      task_id: task_id.into(),
      process_definition_id: process_definition_id.into(),
      form_key: form_key.into(),
      form_name: form_name.into(),
      form_description: None,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.form_description = Some(description.into());
    self
  }
}

/// The three advisory action gates consulted by the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFlags {
  pub save_enabled: bool,
  pub finish_enabled: bool,
  pub cancel_enabled: bool,
}

/// Mutable session state behind the lock.
struct SessionState {
  fields: FieldStore,
  globals: GlobalVariableStore,
  validation: ValidationState,
  flags: ActionFlags,
  strict_mode: bool,
  debug_mode: bool,
  initialized: bool,
  debug_output: Vec<String>,
}

/// One running form-task instance.
///
/// The session exclusively owns its field, variable, and validator
/// collections. The host never runs two script invocations against the same
/// session concurrently; the interior `RwLock` exists so that timer-thread
/// readers cannot observe a half-committed field store.
pub struct FormSession {
  descriptor: SessionDescriptor,
  state: RwLock<SessionState>,
  cancel: CancellationToken,
  torn_down: AtomicBool,
}

impl FormSession {
  /// Open a session for an interaction with the given task.
  pub fn open(descriptor: SessionDescriptor, defaults: &SessionDefaults) -> Self {
    info!(
      session_id = %descriptor.session_id,
      task_id = %descriptor.task_id,
      form_key = %descriptor.form_key,
      "session_opened"
    );
    Self {
      descriptor,
      state: RwLock::new(SessionState {
        fields: FieldStore::new(),
        globals: GlobalVariableStore::new(),
        validation: ValidationState::new(),
        flags: ActionFlags {
          save_enabled: defaults.save_enabled,
          finish_enabled: defaults.finish_enabled,
          cancel_enabled: defaults.cancel_enabled,
        },
        strict_mode: defaults.strict_mode,
        debug_mode: defaults.debug_mode,
        initialized: false,
        debug_output: Vec::new(),
      }),
      cancel: CancellationToken::new(),
      torn_down: AtomicBool::new(false),
    }
  }

  pub fn descriptor(&self) -> &SessionDescriptor {
    &self.descriptor
  }

  /// Token cancelled at teardown. Timers derive child tokens from it so a
  /// closing session takes its timers with it.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  // --- fields ---------------------------------------------------------

  /// Register a field with its initial value. Host-side, at task open.
  pub fn register_field(
    &self,
    field_id: impl Into<String>,
    initial: FieldValue,
  ) -> Result<(), SessionError> {
    self.state.write().unwrap().fields.register(field_id, initial)
  }

  /// Look up a field snapshot. `None` when the field does not exist.
  pub fn field(&self, field_id: &str) -> Option<Field> {
    self.state.read().unwrap().fields.get(field_id).cloned()
  }

  pub fn set_field_value(&self, field_id: &str, value: FieldValue) -> Result<(), SessionError> {
    self.ensure_live()?;
    self.state.write().unwrap().fields.set_value(field_id, value)
  }

  /// Field ids in registration order.
  pub fn field_ids(&self) -> Vec<String> {
    self
      .state
      .read()
      .unwrap()
      .fields
      .field_ids()
      .map(str::to_string)
      .collect()
  }

  pub fn is_field_modified(&self, field_id: &str) -> bool {
    self.state.read().unwrap().fields.is_modified(field_id)
  }

  /// Ids of all fields whose current value differs from the committed one.
  pub fn modified_fields(&self) -> Vec<String> {
    self.state.read().unwrap().fields.modified_fields()
  }

  pub fn is_form_modified(&self) -> bool {
    self.state.read().unwrap().fields.any_modified()
  }

  /// Current values of all fields.
  pub fn form_data(&self) -> HashMap<String, FieldValue> {
    self.state.read().unwrap().fields.form_data()
  }

  /// Commit every field atomically and return the committed form data.
  ///
  /// The write lock is held for the whole sweep, so readers see either the
  /// pre-commit or the post-commit store, never a mix.
  pub fn commit_form_data(&self) -> Result<HashMap<String, FieldValue>, SessionError> {
    self.ensure_live()?;
    let data = self.state.write().unwrap().fields.commit_all();
    info!(
      session_id = %self.descriptor.session_id,
      fields = data.len(),
      "form_committed"
    );
    Ok(data)
  }

  // --- global variables ------------------------------------------------

  pub fn set_global_variable(&self, key: impl Into<String>, value: serde_json::Value) {
    self.state.write().unwrap().globals.set(key, value);
  }

  pub fn global_variable(&self, key: &str) -> Option<serde_json::Value> {
    self.state.read().unwrap().globals.get(key).cloned()
  }

  pub fn is_global_variable_set(&self, key: &str) -> bool {
    self.state.read().unwrap().globals.is_set(key)
  }

  pub fn unset_global_variable(&self, key: &str) {
    self.state.write().unwrap().globals.unset(key);
  }

  // --- validation -------------------------------------------------------

  pub fn register_validator(&self, validator: Box<dyn Validator>) {
    self.state.write().unwrap().validation.register(validator);
  }

  pub fn validator_ids(&self) -> Vec<String> {
    self
      .state
      .read()
      .unwrap()
      .validation
      .validator_ids()
      .map(str::to_string)
      .collect()
  }

  /// Re-evaluate all validators against current field values.
  pub fn is_valid(&self) -> bool {
    let state = self.state.read().unwrap();
    state.validation.is_valid(&state.fields, state.strict_mode)
  }

  /// Per-validator outcomes, for hosts that render messages.
  pub fn validator_outcomes(&self) -> Vec<(String, ValidatorOutcome)> {
    let state = self.state.read().unwrap();
    state.validation.outcomes(&state.fields)
  }

  // --- flags ------------------------------------------------------------

  pub fn set_save_enabled(&self, enabled: bool) {
    self.state.write().unwrap().flags.save_enabled = enabled;
  }

  pub fn is_save_enabled(&self) -> bool {
    self.state.read().unwrap().flags.save_enabled
  }

  pub fn set_finish_enabled(&self, enabled: bool) {
    self.state.write().unwrap().flags.finish_enabled = enabled;
  }

  pub fn is_finish_enabled(&self) -> bool {
    self.state.read().unwrap().flags.finish_enabled
  }

  pub fn set_cancel_enabled(&self, enabled: bool) {
    self.state.write().unwrap().flags.cancel_enabled = enabled;
  }

  pub fn is_cancel_enabled(&self) -> bool {
    self.state.read().unwrap().flags.cancel_enabled
  }

  pub fn action_flags(&self) -> ActionFlags {
    self.state.read().unwrap().flags
  }

  pub fn set_strict_mode(&self, strict: bool) {
    self.state.write().unwrap().strict_mode = strict;
  }

  pub fn is_strict_mode(&self) -> bool {
    self.state.read().unwrap().strict_mode
  }

  pub fn set_debug_mode(&self, debug: bool) {
    self.state.write().unwrap().debug_mode = debug;
  }

  pub fn is_debug_mode(&self) -> bool {
    self.state.read().unwrap().debug_mode
  }

  /// Append a line to the session's debug output. Lines accumulate only
  /// while debug mode is on; the buffer survives toggling it back off.
  pub fn push_debug_output(&self, line: impl Into<String>) {
    let mut state = self.state.write().unwrap();
    if state.debug_mode {
      state.debug_output.push(line.into());
    }
  }

  /// Debug lines accumulated so far, oldest first.
  pub fn debug_output(&self) -> Vec<String> {
    self.state.read().unwrap().debug_output.clone()
  }

  /// Marks the init script as having run. Host-side, once per session.
  pub fn mark_initialized(&self) {
    self.state.write().unwrap().initialized = true;
  }

  pub fn is_initialized(&self) -> bool {
    self.state.read().unwrap().initialized
  }

  // --- lifecycle --------------------------------------------------------

  /// Tear the session down: cancels the session token (and with it every
  /// live timer) and rejects further mutations. Idempotent.
  pub fn teardown(&self) {
    if !self.torn_down.swap(true, Ordering::SeqCst) {
      self.cancel.cancel();
      info!(
        session_id = %self.descriptor.session_id,
        task_id = %self.descriptor.task_id,
        "session_torn_down"
      );
    }
  }

  pub fn is_torn_down(&self) -> bool {
    self.torn_down.load(Ordering::SeqCst)
  }

  fn ensure_live(&self) -> Result<(), SessionError> {
    if self.is_torn_down() {
      return Err(SessionError::TornDown {
        session_id: self.descriptor.session_id.to_string(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validation::FnValidator;

  fn open_session() -> FormSession {
    let descriptor = SessionDescriptor::new(42, "task-1", "proc-def-1", "invoice-form", "Invoice");
    FormSession::open(descriptor, &SessionDefaults::default())
  }

  #[test]
  fn commit_clears_modifications_and_returns_data() {
    let session = open_session();
    session.register_field("a", FieldValue::Integer(1)).unwrap();
    session.register_field("b", FieldValue::from("x")).unwrap();

    session.set_field_value("a", FieldValue::Integer(2)).unwrap();
    assert!(session.is_form_modified());

    let data = session.commit_form_data().unwrap();
    assert_eq!(data["a"], FieldValue::Integer(2));
    for id in session.field_ids() {
      assert!(!session.is_field_modified(&id));
    }
  }

  #[test]
  fn strict_mode_flips_pending_outcome() {
    let session = open_session();
    session.register_validator(Box::new(FnValidator::new("pending", |_| {
      ValidatorOutcome::Pending
    })));

    session.set_strict_mode(true);
    assert!(!session.is_valid());
    session.set_strict_mode(false);
    assert!(session.is_valid());
  }

  #[test]
  fn teardown_cancels_token_and_blocks_mutation() {
    let session = open_session();
    session.register_field("a", FieldValue::Null).unwrap();
    let token = session.cancellation_token();
    assert!(!token.is_cancelled());

    session.teardown();
    session.teardown(); // idempotent

    assert!(token.is_cancelled());
    assert!(session.is_torn_down());
    assert!(matches!(
      session.set_field_value("a", FieldValue::from(1)),
      Err(SessionError::TornDown { .. })
    ));
    assert!(matches!(
      session.commit_form_data(),
      Err(SessionError::TornDown { .. })
    ));
  }

  #[test]
  fn flags_default_from_config() {
    let defaults = SessionDefaults {
      save_enabled: false,
      ..SessionDefaults::default()
    };
    let descriptor = SessionDescriptor::new(1, "t", "d", "k", "n");
    let session = FormSession::open(descriptor, &defaults);
    assert!(!session.is_save_enabled());
    assert!(session.is_finish_enabled());

    session.set_save_enabled(true);
    assert!(session.is_save_enabled());
  }

  #[test]
  fn initialized_flag_starts_false_and_sticks() {
    let session = open_session();
    assert!(!session.is_initialized());
    session.mark_initialized();
    assert!(session.is_initialized());
  }

  #[test]
  fn debug_output_accumulates_only_in_debug_mode() {
    let session = open_session();
    session.push_debug_output("dropped");
    assert!(session.debug_output().is_empty());

    session.set_debug_mode(true);
    session.push_debug_output("first");
    session.push_debug_output("second");
    session.set_debug_mode(false);
    session.push_debug_output("dropped too");

    assert_eq!(session.debug_output(), vec!["first", "second"]);
  }

  #[test]
  fn commit_is_atomic_under_concurrent_readers() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};

    const FIELDS: usize = 8;
    const READERS: usize = 4;

    let session = Arc::new(open_session());
    for i in 0..FIELDS {
      session
        .register_field(format!("f{i}"), FieldValue::Integer(0))
        .unwrap();
    }
    for i in 0..FIELDS {
      session
        .set_field_value(&format!("f{i}"), FieldValue::Integer(1))
        .unwrap();
    }

    let start = Arc::new(Barrier::new(READERS + 1));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..READERS)
      .map(|_| {
        let session = session.clone();
        let start = start.clone();
        let done = done.clone();
        std::thread::spawn(move || {
          start.wait();
          while !done.load(Ordering::SeqCst) {
            // A reader sees the whole pre-commit store or the whole
            // post-commit store, never a mix of the two.
            let modified = session.modified_fields();
            assert!(
              modified.len() == FIELDS || modified.is_empty(),
              "partially committed store observed: {} of {FIELDS} fields modified",
              modified.len(),
            );
          }
        })
      })
      .collect();

    start.wait();
    let data = session.commit_form_data().unwrap();
    done.store(true, Ordering::SeqCst);
    for reader in readers {
      reader.join().unwrap();
    }

    assert_eq!(data.len(), FIELDS);
    assert!(!session.is_form_modified());
  }
}
