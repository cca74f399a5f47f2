use formbridge_service::ServiceError;
use formbridge_session::SessionError;
use thiserror::Error;

/// Errors the facade surfaces to scripts.
///
/// Missing entities (fields, labels, globals) are not errors — they come
/// back as `None`. Policy-denied actions come back as `false`. Only genuine
/// failures land here.
#[derive(Debug, Error)]
pub enum FacadeError {
  #[error(transparent)]
  Session(#[from] SessionError),

  #[error(transparent)]
  Service(#[from] ServiceError),
}
