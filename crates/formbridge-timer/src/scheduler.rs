use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::handle::TimerHandle;

/// Callback invoked by the scheduler. Failures are isolated per firing.
pub type TimerCallback =
  Box<dyn FnMut() -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>;

/// Schedules callbacks bound to one session's lifetime.
///
/// Every timer derives a child token from the session's cancellation token,
/// so tearing the session down cancels all live timers without the scheduler
/// having to enumerate them. Must be used from within a tokio runtime.
pub struct TimerScheduler {
  session_cancel: CancellationToken,
  live: Arc<Mutex<HashMap<u64, CancellationToken>>>,
  next_id: AtomicU64,
}

impl TimerScheduler {
  /// Create a scheduler whose timers die with the given session token.
  pub fn new(session_cancel: CancellationToken) -> Self {
    Self {
      session_cancel,
      live: Arc::new(Mutex::new(HashMap::new())),
      next_id: AtomicU64::new(1),
    }
  }

  /// Schedule a callback to run once after `delay`.
  pub fn schedule_once(&self, delay: Duration, mut callback: TimerCallback) -> TimerHandle {
    let (id, token) = self.track();
    let handle = TimerHandle::new(id, delay, false, token.clone());
    let live = Arc::clone(&self.live);

    tokio::spawn(async move {
      tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
          // The token may have been cancelled between the sleep completing
          // and this branch running.
          if !token.is_cancelled() {
            fire(id, &mut callback);
          }
        }
      }
      live.lock().unwrap().remove(&id);
    });

    handle
  }

  /// Schedule a callback to run every `period`.
  ///
  /// The first firing happens one full period after scheduling. Firings are
  /// strictly ordered and never overlap: the callback runs inline in the
  /// timer task, and a tick that would land inside a slow firing is delayed
  /// rather than stacked.
  pub fn schedule_repeating(&self, period: Duration, mut callback: TimerCallback) -> TimerHandle {
    let (id, token) = self.track();
    let handle = TimerHandle::new(id, period, true, token.clone());
    let live = Arc::clone(&self.live);

    tokio::spawn(async move {
      let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

      loop {
        tokio::select! {
          _ = token.cancelled() => break,
          _ = ticker.tick() => {
            if token.is_cancelled() {
              break;
            }
            fire(id, &mut callback);
          }
        }
      }
      live.lock().unwrap().remove(&id);
    });

    handle
  }

  /// Cancel every live timer. Used at session teardown, before any
  /// session-scoped external resource is released.
  pub fn cancel_all(&self) {
    let live = self.live.lock().unwrap();
    for token in live.values() {
      token.cancel();
    }
  }

  /// Number of timers that are neither cancelled nor finished.
  pub fn live_timers(&self) -> usize {
    self
      .live
      .lock()
      .unwrap()
      .values()
      .filter(|t| !t.is_cancelled())
      .count()
  }

  fn track(&self) -> (u64, CancellationToken) {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let token = self.session_cancel.child_token();
    self.live.lock().unwrap().insert(id, token.clone());
    (id, token)
  }
}

fn fire(timer_id: u64, callback: &mut TimerCallback) {
  debug!(timer_id, "timer_fired");
  if let Err(e) = callback() {
    // Best-effort reporting; a failing firing must not affect the
    // scheduler or other timers.
    warn!(timer_id, error = %e, "timer callback failed");
  }
}
