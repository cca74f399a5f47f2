//! The capability-scoped bridge object exposed to form scripts.
//!
//! A host injects an [`EngineFacade`] into each script invocation. The facade
//! composes the session's field, variable, timer, and validation state with
//! read-only snapshots of externally-owned entities (task, user, layouts) and
//! the process-wide service registry.
//!
//! # Architecture
//!
//! ```text
//! EngineContext              host-side wiring, shared across sessions
//! ├── ServiceRegistry        closed key -> typed service (db, messages)
//! ├── ProcessEngine          task & process metadata (external)
//! ├── IdentityStore          logged user (external)
//! ├── LayoutRegistry         layouts & labels (external)
//! └── ClosePolicy            may a non-forced close proceed?
//!
//! EngineFacade = bind(context, session)   one per script invocation
//! ├── FieldAccess            field reads, mutation, commit
//! ├── SessionControl         action flags, close
//! ├── GlobalVariables        session-scoped key/value
//! ├── Validation             strict mode, pull-based validity
//! └── Timers                 session-bound one-shot/repeating callbacks
//! ```
//!
//! Capability checks happen in the facade; the facade never performs
//! save/finish/cancel itself — the flags are advisory gates for the
//! presenter.

mod collaborators;
mod debug;
mod error;
mod facade;
mod snapshot;
mod traits;
mod ui;

pub use collaborators::{
  ClosePolicy, DefaultClosePolicy, HistoricTaskInfo, IdentityStore, LabelInfo, LayoutInfo,
  LayoutRegistry, ProcessEngine, TaskInfo, UserInfo,
};
pub use debug::{DebugSink, TracingDebugSink};
pub use error::FacadeError;
pub use facade::{EngineContext, EngineFacade};
pub use snapshot::InvocationSnapshot;
pub use traits::{FieldAccess, GlobalVariables, SessionControl, Timers, Validation};
pub use ui::{UiCommand, UiHandle, UiReceiver};
