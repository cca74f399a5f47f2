use serde::{Deserialize, Serialize};

/// Initial flag values for a newly opened form session.
///
/// These are starting values only; scripts may flip any of them through the
/// facade while the session is live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
  /// Whether the presenter may save the form.
  #[serde(default = "default_true")]
  pub save_enabled: bool,

  /// Whether the presenter may finish (complete) the task.
  #[serde(default = "default_true")]
  pub finish_enabled: bool,

  /// Whether the presenter may cancel the form.
  #[serde(default = "default_true")]
  pub cancel_enabled: bool,

  /// Strict validation: indeterminate validator outcomes count as failing.
  #[serde(default)]
  pub strict_mode: bool,

  /// Route debug messages from scripts to the host's debug sink.
  #[serde(default)]
  pub debug_mode: bool,
}

fn default_true() -> bool {
  true
}

impl Default for SessionDefaults {
  fn default() -> Self {
    Self {
      save_enabled: true,
      finish_enabled: true,
      cancel_enabled: true,
      strict_mode: false,
      debug_mode: false,
    }
  }
}
