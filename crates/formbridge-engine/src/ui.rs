use tokio::sync::mpsc;
use tracing::warn;

/// A closure marshalled onto the UI-owning execution context.
pub type UiCommand = Box<dyn FnOnce() + Send>;

/// Sending half, held by facades. Background-scheduled callbacks (timers,
/// async service results) must not touch UI-owned state directly; they hand
/// a closure here instead.
#[derive(Clone)]
pub struct UiHandle {
  tx: mpsc::UnboundedSender<UiCommand>,
}

impl UiHandle {
  /// Create a handle plus the receiver the UI loop drains.
  pub fn channel() -> (UiHandle, UiReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiHandle { tx }, UiReceiver { rx })
  }

  /// Queue a closure for the UI context. Best-effort: returns `false` when
  /// the UI loop is gone (e.g. the presenter already closed).
  pub fn dispatch(&self, command: impl FnOnce() + Send + 'static) -> bool {
    if self.tx.send(Box::new(command)).is_err() {
      warn!("ui update dropped: receiver closed");
      return false;
    }
    true
  }
}

/// Receiving half, owned by whatever loop owns UI state.
pub struct UiReceiver {
  rx: mpsc::UnboundedReceiver<UiCommand>,
}

impl UiReceiver {
  /// Wait for the next queued command. `None` when all handles are dropped.
  pub async fn recv(&mut self) -> Option<UiCommand> {
    self.rx.recv().await
  }

  /// Run every command queued so far. Returns how many ran.
  pub fn run_pending(&mut self) -> usize {
    let mut ran = 0;
    while let Ok(command) = self.rx.try_recv() {
      command();
      ran += 1;
    }
    ran
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[tokio::test]
  async fn dispatched_commands_run_on_receiver() {
    let (handle, mut receiver) = UiHandle::channel();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
      let counter = counter.clone();
      assert!(handle.dispatch(move || {
        counter.fetch_add(1, Ordering::SeqCst);
      }));
    }

    // Nothing runs until the UI loop drains the queue.
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(receiver.run_pending(), 3);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn dispatch_after_receiver_drop_is_best_effort() {
    let (handle, receiver) = UiHandle::channel();
    drop(receiver);
    assert!(!handle.dispatch(|| {}));
  }
}
