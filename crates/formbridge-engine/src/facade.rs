use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use formbridge_service::{ServiceHandle, ServiceRegistry};
use formbridge_session::{Field, FieldValue, FormSession, ValidatorOutcome};
use formbridge_timer::{TimerCallback, TimerHandle, TimerScheduler};
use tracing::{debug, info};
use uuid::Uuid;

use crate::collaborators::{
  ClosePolicy, DefaultClosePolicy, HistoricTaskInfo, IdentityStore, LabelInfo, LayoutInfo,
  LayoutRegistry, ProcessEngine, TaskInfo, UserInfo,
};
use crate::debug::{DebugSink, TracingDebugSink};
use crate::error::FacadeError;
use crate::snapshot::InvocationSnapshot;
use crate::traits::{FieldAccess, GlobalVariables, SessionControl, Timers, Validation};
use crate::ui::UiHandle;

/// Host-side wiring shared by all sessions: the service registry plus the
/// external collaborators facades read from.
pub struct EngineContext {
  pub services: Arc<ServiceRegistry>,
  pub process_engine: Arc<dyn ProcessEngine>,
  pub identity: Arc<dyn IdentityStore>,
  pub layouts: Arc<dyn LayoutRegistry>,
  pub close_policy: Arc<dyn ClosePolicy>,
  pub debug_sink: Arc<dyn DebugSink>,
  pub ui: UiHandle,
}

impl EngineContext {
  /// Wire a context with the default close policy and debug sink.
  pub fn new(
    services: Arc<ServiceRegistry>,
    process_engine: Arc<dyn ProcessEngine>,
    identity: Arc<dyn IdentityStore>,
    layouts: Arc<dyn LayoutRegistry>,
    ui: UiHandle,
  ) -> Self {
    Self {
      services,
      process_engine,
      identity,
      layouts,
      close_policy: Arc::new(DefaultClosePolicy),
      debug_sink: Arc::new(TracingDebugSink),
      ui,
    }
  }

  pub fn with_close_policy(mut self, policy: Arc<dyn ClosePolicy>) -> Self {
    self.close_policy = policy;
    self
  }

  pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
    self.debug_sink = sink;
    self
  }
}

/// The bridge object injected into one script invocation.
///
/// Holds a non-owning reference to exactly one session. External metadata
/// (task, user, process variables) is snapshotted at bind time, so reads are
/// stable for the whole invocation even if the underlying entity changes.
pub struct EngineFacade {
  session: Arc<FormSession>,
  scheduler: TimerScheduler,
  services: Arc<ServiceRegistry>,
  process_engine: Arc<dyn ProcessEngine>,
  layouts: Arc<dyn LayoutRegistry>,
  close_policy: Arc<dyn ClosePolicy>,
  debug_sink: Arc<dyn DebugSink>,
  ui: UiHandle,
  snapshot: InvocationSnapshot,
  engine_uuid: Uuid,
}

impl EngineFacade {
  /// Bind a facade to a session for one script invocation.
  pub fn bind(context: &EngineContext, session: Arc<FormSession>) -> Self {
    let descriptor = session.descriptor();
    let snapshot = InvocationSnapshot::new(
      context.process_engine.task(&descriptor.task_id),
      context.process_engine.historic_task(&descriptor.task_id),
      context.identity.logged_user(),
      context
        .process_engine
        .process_variables(descriptor.process_instance_id),
    );

    debug!(
      session_id = %descriptor.session_id,
      task_id = %descriptor.task_id,
      "facade_bound"
    );

    Self {
      scheduler: TimerScheduler::new(session.cancellation_token()),
      session,
      services: context.services.clone(),
      process_engine: context.process_engine.clone(),
      layouts: context.layouts.clone(),
      close_policy: context.close_policy.clone(),
      debug_sink: context.debug_sink.clone(),
      ui: context.ui.clone(),
      snapshot,
      engine_uuid: Uuid::new_v4(),
    }
  }

  pub fn session(&self) -> &Arc<FormSession> {
    &self.session
  }

  // --- snapshot accessors (pure reads, no session mutation) -------------

  /// The task this session was opened for, as of bind time.
  pub fn task(&self) -> Option<&TaskInfo> {
    self.snapshot.task()
  }

  /// History-service record for the task, as of bind time. `None` when the
  /// engine keeps no history for it.
  pub fn historic_task(&self) -> Option<&HistoricTaskInfo> {
    self.snapshot.historic_task()
  }

  pub fn task_id(&self) -> &str {
    &self.session.descriptor().task_id
  }

  pub fn process_instance_id(&self) -> i64 {
    self.session.descriptor().process_instance_id
  }

  pub fn process_definition_id(&self) -> &str {
    &self.session.descriptor().process_definition_id
  }

  pub fn process_variables(&self) -> &HashMap<String, serde_json::Value> {
    self.snapshot.process_variables()
  }

  pub fn logged_user(&self) -> &UserInfo {
    self.snapshot.user()
  }

  pub fn layout(&self, layout_id: &str) -> Option<LayoutInfo> {
    self.snapshot.layout(self.layouts.as_ref(), layout_id)
  }

  pub fn layout_ids(&self) -> Vec<String> {
    self.snapshot.layout_ids(self.layouts.as_ref())
  }

  pub fn label(&self, label_id: &str) -> Option<LabelInfo> {
    self.snapshot.label(self.layouts.as_ref(), label_id)
  }

  pub fn form_name(&self) -> &str {
    &self.session.descriptor().form_name
  }

  pub fn form_description(&self) -> Option<&str> {
    self.session.descriptor().form_description.as_deref()
  }

  pub fn form_key(&self) -> &str {
    &self.session.descriptor().form_key
  }

  /// Whether the host has run this form's init script.
  pub fn is_form_initialized(&self) -> bool {
    self.session.is_initialized()
  }

  // --- services ---------------------------------------------------------

  /// Resolve a library by key, as scripts do: `load_script("db")`.
  pub async fn load_script(&self, key: &str) -> Result<ServiceHandle, FacadeError> {
    Ok(self.services.load_script(key).await?)
  }

  pub fn services(&self) -> &Arc<ServiceRegistry> {
    &self.services
  }

  // --- debug channel ----------------------------------------------------

  pub fn set_debug_mode(&self, debug: bool) {
    self.session.set_debug_mode(debug);
  }

  pub fn is_debug_mode(&self) -> bool {
    self.session.is_debug_mode()
  }

  /// Debug lines recorded so far for this session, oldest first.
  pub fn debug_output(&self) -> Vec<String> {
    self.session.debug_output()
  }

  /// Send a debug message to the host's debug channel. Best-effort; when
  /// the session is not in debug mode the message goes to trace logging
  /// only.
  pub fn debug(&self, message: &str) {
    if self.session.is_debug_mode() {
      self.session.push_debug_output(message);
      self
        .debug_sink
        .debug(self.session.descriptor().session_id, message);
    } else {
      debug!(
        session_id = %self.session.descriptor().session_id,
        message,
        "script_debug_suppressed"
      );
    }
  }

  /// Structured variant of [`debug`](Self::debug), kept as a separate entry
  /// point because hosts route it to their diagnostics panel.
  pub fn handle_debug_info(&self, data: &str) {
    self.debug(data);
  }

  /// Human-readable description of the engine context, for script authors
  /// diagnosing a form.
  pub fn engine_context_info(&self) -> String {
    let descriptor = self.session.descriptor();
    format!(
      "session={} task={} process_instance={} process_definition={} form={} fields={} strict={} valid={}",
      descriptor.session_id,
      descriptor.task_id,
      descriptor.process_instance_id,
      descriptor.process_definition_id,
      descriptor.form_key,
      self.session.field_ids().len(),
      self.session.is_strict_mode(),
      self.session.is_valid(),
    )
  }

  // --- ui marshaling ----------------------------------------------------

  /// Marshal a closure onto the execution context that owns UI state.
  /// Background callbacks must use this instead of touching UI state.
  pub fn update_ui(&self, callback: impl FnOnce() + Send + 'static) -> bool {
    self.ui.dispatch(callback)
  }

  // --- misc -------------------------------------------------------------

  pub fn generate_uuid(&self) -> Uuid {
    Uuid::new_v4()
  }

  pub fn engine_uuid(&self) -> Uuid {
    self.engine_uuid
  }

  /// Timers currently live for this invocation's scheduler.
  pub fn live_timers(&self) -> usize {
    self.scheduler.live_timers()
  }
}

impl FieldAccess for EngineFacade {
  fn field(&self, field_id: &str) -> Option<Field> {
    self.session.field(field_id)
  }

  fn set_field_value(&self, field_id: &str, value: FieldValue) -> Result<(), FacadeError> {
    Ok(self.session.set_field_value(field_id, value)?)
  }

  fn field_ids(&self) -> Vec<String> {
    self.session.field_ids()
  }

  fn is_field_modified(&self, field_id: &str) -> bool {
    self.session.is_field_modified(field_id)
  }

  fn modified_fields(&self) -> Vec<String> {
    self.session.modified_fields()
  }

  fn is_form_modified(&self) -> bool {
    self.session.is_form_modified()
  }

  fn form_data(&self) -> HashMap<String, FieldValue> {
    self.session.form_data()
  }

  fn commit_and_get_form_data(&self) -> Result<HashMap<String, FieldValue>, FacadeError> {
    Ok(self.session.commit_form_data()?)
  }
}

impl SessionControl for EngineFacade {
  fn set_save_enabled(&self, enabled: bool) {
    self.session.set_save_enabled(enabled);
  }

  fn is_save_enabled(&self) -> bool {
    self.session.is_save_enabled()
  }

  fn set_finish_enabled(&self, enabled: bool) {
    self.session.set_finish_enabled(enabled);
  }

  fn is_finish_enabled(&self) -> bool {
    self.session.is_finish_enabled()
  }

  fn set_cancel_enabled(&self, enabled: bool) {
    self.session.set_cancel_enabled(enabled);
  }

  fn is_cancel_enabled(&self) -> bool {
    self.session.is_cancel_enabled()
  }

  fn close(&self, force: bool) -> bool {
    if !force && !self.close_policy.may_close(&self.session) {
      info!(
        session_id = %self.session.descriptor().session_id,
        "close_blocked_by_policy"
      );
      return false;
    }

    // Timers first, so no late firing observes released state; only then
    // may the engine release session-scoped resources.
    self.scheduler.cancel_all();
    self.session.teardown();
    self.process_engine.session_closed(self.session.descriptor());
    true
  }
}

impl GlobalVariables for EngineFacade {
  fn set_global_variable(&self, key: &str, value: serde_json::Value) {
    self.session.set_global_variable(key, value);
  }

  fn global_variable(&self, key: &str) -> Option<serde_json::Value> {
    self.session.global_variable(key)
  }

  fn is_global_variable_set(&self, key: &str) -> bool {
    self.session.is_global_variable_set(key)
  }

  fn unset_global_variable(&self, key: &str) {
    self.session.unset_global_variable(key);
  }
}

impl Validation for EngineFacade {
  fn set_strict_mode(&self, strict: bool) {
    self.session.set_strict_mode(strict);
  }

  fn is_strict_mode(&self) -> bool {
    self.session.is_strict_mode()
  }

  fn is_valid(&self) -> bool {
    self.session.is_valid()
  }

  fn validator_ids(&self) -> Vec<String> {
    self.session.validator_ids()
  }

  fn validator_outcomes(&self) -> Vec<(String, ValidatorOutcome)> {
    self.session.validator_outcomes()
  }
}

impl Timers for EngineFacade {
  fn register_timer_command(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
    self.scheduler.schedule_once(delay, callback)
  }

  fn register_repeating_timer(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
    self.scheduler.schedule_repeating(period, callback)
  }
}
