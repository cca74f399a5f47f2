//! Library services reachable from form scripts.
//!
//! Scripts load auxiliary libraries through a closed, type-safe registry:
//! a string key from a fixed set resolves to a strongly-typed service
//! instance. The set is closed at build time — adding a library means adding
//! a [`ServiceKey`] variant and its construction arm, never an ad-hoc string.
//!
//! Construction is lazy, cached, and single-flight: concurrent first callers
//! for the same key share one in-flight construction, and a failed
//! construction is not cached — the next call retries.

mod error;
mod key;
mod message;
mod query;
mod registry;

pub use error::ServiceError;
pub use key::ServiceKey;
pub use message::{MessageOptions, MessageService, MessageSink, TracingMessageSink};
pub use query::QueryService;
pub use registry::{ServiceHandle, ServiceRegistry};
