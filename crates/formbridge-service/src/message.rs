use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Structured configuration for one notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageOptions {
  /// Title shown above the message body.
  pub caption: String,
  /// Message body.
  pub msg: String,
  /// Icon identifier understood by the presenter.
  #[serde(default)]
  pub icon: String,
  /// Display width in pixels.
  #[serde(default = "default_width")]
  pub width: u32,
}

fn default_width() -> u32 {
  400
}

impl MessageOptions {
  pub fn new(caption: impl Into<String>, msg: impl Into<String>) -> Self {
    Self {
      caption: caption.into(),
      msg: msg.into(),
      icon: String::new(),
      width: default_width(),
    }
  }

  pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
    self.icon = icon.into();
    self
  }

  pub fn with_width(mut self, width: u32) -> Self {
    self.width = width;
    self
  }
}

/// Where shown messages end up. The presenter supplies the real sink;
/// the default logs through tracing.
pub trait MessageSink: Send + Sync {
  fn show(&self, options: &MessageOptions);
}

/// Default sink: structured log line per message.
#[derive(Debug, Default)]
pub struct TracingMessageSink;

impl MessageSink for TracingMessageSink {
  fn show(&self, options: &MessageOptions) {
    info!(
      caption = %options.caption,
      msg = %options.msg,
      icon = %options.icon,
      width = options.width,
      "message_shown"
    );
  }
}

/// Notification service behind the `"messages"` registry key.
///
/// `show` is fire-and-forget: no return value, no delivery guarantee beyond
/// handing the options to the sink.
pub struct MessageService {
  sink: Arc<dyn MessageSink>,
}

impl MessageService {
  pub fn new(sink: Arc<dyn MessageSink>) -> Self {
    Self { sink }
  }

  pub fn show(&self, options: &MessageOptions) {
    self.sink.show(options);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  #[derive(Default)]
  struct CapturingSink {
    shown: Mutex<Vec<MessageOptions>>,
  }

  impl MessageSink for CapturingSink {
    fn show(&self, options: &MessageOptions) {
      self.shown.lock().unwrap().push(options.clone());
    }
  }

  #[test]
  fn show_delivers_to_sink() {
    let sink = Arc::new(CapturingSink::default());
    let service = MessageService::new(sink.clone());

    service.show(&MessageOptions::new("Saved", "Form saved successfully").with_icon("info"));

    let shown = sink.shown.lock().unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].caption, "Saved");
    assert_eq!(shown[0].icon, "info");
    assert_eq!(shown[0].width, 400);
  }

  #[test]
  fn options_deserialize_with_defaults() {
    let options: MessageOptions =
      serde_json::from_str(r#"{"caption": "Hi", "msg": "There"}"#).unwrap();
    assert_eq!(options.width, 400);
    assert!(options.icon.is_empty());
  }
}
