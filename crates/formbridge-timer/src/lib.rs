//! Session-scoped timers.
//!
//! Scripts may schedule one-shot and repeating callbacks through the facade.
//! Firings run on the tokio runtime, which is a different scheduling domain
//! than the script/UI context; callbacks that need to touch UI-owned state
//! must marshal through the facade's `update_ui`.
//!
//! Guarantees:
//! - successive firings of one repeating timer are strictly ordered and
//!   non-overlapping (the callback runs inline in the timer task, and a slow
//!   firing delays the next tick rather than stacking),
//! - a cancelled handle never fires again after `cancel()` returns, modulo
//!   one firing already dispatched,
//! - a failing callback is isolated to its own firing and reported through
//!   tracing; the scheduler and sibling timers are unaffected.

mod handle;
mod scheduler;

pub use handle::TimerHandle;
pub use scheduler::{TimerCallback, TimerScheduler};
