use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::collaborators::{
  HistoricTaskInfo, LabelInfo, LayoutInfo, LayoutRegistry, TaskInfo, UserInfo,
};

/// Stable view of externally-owned entities for one script invocation.
///
/// Task, user, and process variables are captured when the facade is bound;
/// layout and label lookups are resolved on first use and pinned for the
/// rest of the invocation. Either way a script never observes an external
/// entity changing mid-invocation.
pub struct InvocationSnapshot {
  pub(crate) task: Option<TaskInfo>,
  pub(crate) historic_task: Option<HistoricTaskInfo>,
  pub(crate) user: UserInfo,
  pub(crate) process_variables: HashMap<String, serde_json::Value>,
  layouts: Mutex<HashMap<String, Option<LayoutInfo>>>,
  labels: Mutex<HashMap<String, Option<LabelInfo>>>,
  layout_ids: OnceLock<Vec<String>>,
}

impl InvocationSnapshot {
  pub(crate) fn new(
    task: Option<TaskInfo>,
    historic_task: Option<HistoricTaskInfo>,
    user: UserInfo,
    process_variables: HashMap<String, serde_json::Value>,
  ) -> Self {
    Self {
      task,
      historic_task,
      user,
      process_variables,
      layouts: Mutex::new(HashMap::new()),
      labels: Mutex::new(HashMap::new()),
      layout_ids: OnceLock::new(),
    }
  }

  pub fn task(&self) -> Option<&TaskInfo> {
    self.task.as_ref()
  }

  pub fn historic_task(&self) -> Option<&HistoricTaskInfo> {
    self.historic_task.as_ref()
  }

  pub fn user(&self) -> &UserInfo {
    &self.user
  }

  pub fn process_variables(&self) -> &HashMap<String, serde_json::Value> {
    &self.process_variables
  }

  /// Resolve a layout through the registry, pinning the first answer.
  pub(crate) fn layout(&self, registry: &dyn LayoutRegistry, id: &str) -> Option<LayoutInfo> {
    self
      .layouts
      .lock()
      .unwrap()
      .entry(id.to_string())
      .or_insert_with(|| registry.layout(id))
      .clone()
  }

  /// Known layout ids, pinned on first use.
  pub(crate) fn layout_ids(&self, registry: &dyn LayoutRegistry) -> Vec<String> {
    self
      .layout_ids
      .get_or_init(|| registry.layout_ids())
      .clone()
  }

  /// Resolve a label through the registry, pinning the first answer.
  pub(crate) fn label(&self, registry: &dyn LayoutRegistry, id: &str) -> Option<LabelInfo> {
    self
      .labels
      .lock()
      .unwrap()
      .entry(id.to_string())
      .or_insert_with(|| registry.label(id))
      .clone()
  }
}
