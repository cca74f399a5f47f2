//! Formbridge — a capability-scoped scripting bridge for a form/workflow
//! host.
//!
//! Embedded form scripts interact with the host exclusively through an
//! [`EngineFacade`] bound to one [`FormSession`], and load auxiliary
//! libraries (database queries, notifications) through the closed
//! [`ServiceRegistry`]. This crate re-exports the workspace surface; hosts
//! typically depend on it alone.
//!
//! ```no_run
//! use std::sync::Arc;
//! use formbridge::{
//!   BridgeConfig, EngineContext, EngineFacade, FieldAccess, FieldValue, FormSession,
//!   ServiceRegistry, SessionDefaults, SessionDescriptor, UiHandle,
//! };
//! # use formbridge::{IdentityStore, LayoutRegistry, ProcessEngine};
//! # fn wire(process_engine: Arc<dyn ProcessEngine>, identity: Arc<dyn IdentityStore>,
//! #         layouts: Arc<dyn LayoutRegistry>) {
//! let (ui, _ui_loop) = UiHandle::channel();
//! let context = EngineContext::new(
//!   Arc::new(ServiceRegistry::new(BridgeConfig::default())),
//!   process_engine,
//!   identity,
//!   layouts,
//!   ui,
//! );
//!
//! let descriptor = SessionDescriptor::new(42, "task-1", "review:1", "invoice", "Invoice");
//! let session = Arc::new(FormSession::open(descriptor, &SessionDefaults::default()));
//! session.register_field("amount", FieldValue::Integer(0)).unwrap();
//!
//! // One facade per script invocation.
//! let engine = EngineFacade::bind(&context, session);
//! assert!(engine.field("amount").is_some());
//! # }
//! ```

pub use formbridge_config::{BridgeConfig, ConfigError, ConnectionConfig, SessionDefaults};
pub use formbridge_engine::{
  ClosePolicy, DebugSink, DefaultClosePolicy, EngineContext, EngineFacade, FacadeError,
  FieldAccess, GlobalVariables, HistoricTaskInfo, IdentityStore, InvocationSnapshot, LabelInfo,
  LayoutInfo, LayoutRegistry, ProcessEngine, SessionControl, TaskInfo, Timers, TracingDebugSink,
  UiCommand, UiHandle, UiReceiver, UserInfo, Validation,
};
pub use formbridge_service::{
  MessageOptions, MessageService, MessageSink, QueryService, ServiceError, ServiceHandle,
  ServiceKey, ServiceRegistry, TracingMessageSink,
};
pub use formbridge_session::{
  ActionFlags, Field, FieldStore, FieldValue, FnValidator, FormSession, GlobalVariableStore,
  SessionDescriptor, SessionError, ValidationState, Validator, ValidatorOutcome,
};
pub use formbridge_timer::{TimerCallback, TimerHandle, TimerScheduler};
