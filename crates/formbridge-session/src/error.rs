use thiserror::Error;

/// Errors that can occur against session state.
#[derive(Debug, Error)]
pub enum SessionError {
  /// A field id was registered twice for the same session.
  #[error("field '{field_id}' is already registered")]
  DuplicateField { field_id: String },

  /// A mutation targeted a field that was never registered.
  #[error("field '{field_id}' is not registered")]
  UnknownField { field_id: String },

  /// A mutation arrived after the session was torn down.
  #[error("session '{session_id}' is torn down")]
  TornDown { session_id: String },
}
