//! Per-session form state.
//!
//! A [`FormSession`] represents one running form-task instance: its field
//! values (current and committed), session-scoped global variables,
//! registered validators, and the advisory action flags the presenter
//! consults before allowing save/finish/cancel.
//!
//! Sessions are single-logical-threaded from the script's point of view: the
//! host never runs two script invocations against the same session
//! concurrently. The interior lock exists only so that a commit is atomic
//! with respect to readers on scheduler threads.

mod error;
mod field;
mod globals;
mod session;
mod validation;
mod value;

pub use error::SessionError;
pub use field::{Field, FieldStore};
pub use globals::GlobalVariableStore;
pub use session::{ActionFlags, FormSession, SessionDescriptor};
pub use validation::{FnValidator, ValidationState, Validator, ValidatorOutcome};
pub use value::FieldValue;
