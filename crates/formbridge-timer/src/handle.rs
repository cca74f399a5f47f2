use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Handle to one scheduled timer.
///
/// Dropping the handle does not cancel the timer; the timer stays bound to
/// the session and is cancelled explicitly or at session teardown.
#[derive(Debug, Clone)]
pub struct TimerHandle {
  id: u64,
  interval: Duration,
  repeating: bool,
  cancel: CancellationToken,
}

impl TimerHandle {
  pub(crate) fn new(
    id: u64,
    interval: Duration,
    repeating: bool,
    cancel: CancellationToken,
  ) -> Self {
    Self {
      id,
      interval,
      repeating,
      cancel,
    }
  }

  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn interval(&self) -> Duration {
    self.interval
  }

  pub fn is_repeating(&self) -> bool {
    self.repeating
  }

  /// Prevent any future firing.
  ///
  /// A firing already in flight completes, but the timer task re-checks the
  /// token before every invocation, so no firing starts after this returns.
  pub fn cancel(&self) {
    self.cancel.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }
}
