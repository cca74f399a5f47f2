//! External collaborators the bridge reads from but does not implement.

use chrono::{DateTime, Utc};
use formbridge_session::{FormSession, SessionDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The task a session was opened for, as owned by the process engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
  pub task_id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assignee: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub due_at: Option<DateTime<Utc>>,
}

/// Completed-task record from the engine's history service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricTaskInfo {
  pub task_id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assignee: Option<String>,
  pub started_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ended_at: Option<DateTime<Utc>>,
}

/// The logged user, as owned by the identity store.
///
/// The bridge exposes reads only; account mutation stays with the identity
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
  pub login: String,
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub roles: Vec<String>,
  pub active: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub account_expiration: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub init_script: Option<String>,
}

/// A layout panel known to the layout registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
  pub layout_id: String,
  pub title: String,
}

/// A localizable label. Localization itself is the host's concern; the
/// bridge hands scripts the resolved text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelInfo {
  pub label_id: String,
  pub text: String,
}

/// Task and process metadata owned by the workflow engine.
pub trait ProcessEngine: Send + Sync {
  /// Look up the task a session is bound to. `None` when the task is gone.
  fn task(&self, task_id: &str) -> Option<TaskInfo>;

  /// History-service record for the task. `None` when the engine keeps no
  /// history or the task has none yet.
  fn historic_task(&self, _task_id: &str) -> Option<HistoricTaskInfo> {
    None
  }

  /// Variables of the owning process instance.
  fn process_variables(&self, process_instance_id: i64) -> HashMap<String, serde_json::Value>;

  /// Notification that a session finished teardown. Runs after all the
  /// session's timers are cancelled, so the engine may release any
  /// resources it holds for this session.
  fn session_closed(&self, _descriptor: &SessionDescriptor) {}
}

/// Identity store owning user accounts.
pub trait IdentityStore: Send + Sync {
  fn logged_user(&self) -> UserInfo;
}

/// Registry of layouts and labels owned by the form renderer.
pub trait LayoutRegistry: Send + Sync {
  fn layout(&self, layout_id: &str) -> Option<LayoutInfo>;
  fn layout_ids(&self) -> Vec<String>;
  fn label(&self, label_id: &str) -> Option<LabelInfo>;
}

/// Decides whether a non-forced close may proceed. Forced closes never
/// consult the policy.
pub trait ClosePolicy: Send + Sync {
  fn may_close(&self, session: &FormSession) -> bool;
}

/// Default policy: a non-forced close is blocked while validation is
/// outstanding, or while unsaved modifications exist and saving is enabled.
#[derive(Debug, Default)]
pub struct DefaultClosePolicy;

impl ClosePolicy for DefaultClosePolicy {
  fn may_close(&self, session: &FormSession) -> bool {
    if !session.is_valid() {
      return false;
    }
    !(session.is_save_enabled() && session.is_form_modified())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use formbridge_config::SessionDefaults;
  use formbridge_session::FieldValue;

  fn session() -> FormSession {
    let descriptor = SessionDescriptor::new(1, "t", "d", "k", "Form");
    let session = FormSession::open(descriptor, &SessionDefaults::default());
    session.register_field("a", FieldValue::Null).unwrap();
    session
  }

  #[test]
  fn default_policy_blocks_unsaved_changes() {
    let session = session();
    let policy = DefaultClosePolicy;
    assert!(policy.may_close(&session));

    session.set_field_value("a", FieldValue::from(1)).unwrap();
    assert!(!policy.may_close(&session));

    // With saving disabled the modification no longer blocks.
    session.set_save_enabled(false);
    assert!(policy.may_close(&session));
  }
}
