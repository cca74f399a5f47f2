use tracing::debug;
use uuid::Uuid;

/// Best-effort sink for script debug messages.
///
/// Delivery is not guaranteed; a sink must never fail the calling script.
pub trait DebugSink: Send + Sync {
  fn debug(&self, session_id: Uuid, message: &str);
}

/// Default sink: one structured debug line per message.
#[derive(Debug, Default)]
pub struct TracingDebugSink;

impl DebugSink for TracingDebugSink {
  fn debug(&self, session_id: Uuid, message: &str) {
    debug!(session_id = %session_id, message, "script_debug");
  }
}
