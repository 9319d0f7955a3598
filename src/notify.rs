//! User-facing notifications ("toasts") emitted by the logic shells.
//!
//! The grading engine and the state machines never notify; only `logic` does, after an
//! operation succeeds or fails. Sinks must not block the caller.

use std::{sync::Arc, time::Duration};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::NotificationsCfg;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Info,
  Success,
  Warning,
  Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
  pub severity: Severity,
  pub title: String,
  pub message: String,
}

impl Notification {
  pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
    Self { severity, title: title.into(), message: message.into() }
  }
  pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self { Self::new(Severity::Success, title, message) }
  pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self { Self::new(Severity::Error, title, message) }
}

pub trait NotificationSink: Send + Sync {
  fn notify(&self, n: Notification);
}

/// Writes notifications to the log under the `notify` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
  fn notify(&self, n: Notification) {
    match n.severity {
      Severity::Error => error!(target: "notify", title = %n.title, message = %n.message, "notification"),
      Severity::Warning => warn!(target: "notify", title = %n.title, message = %n.message, "notification"),
      Severity::Info | Severity::Success => {
        info!(target: "notify", severity = ?n.severity, title = %n.title, message = %n.message, "notification")
      }
    }
  }
}

/// POSTs each notification as JSON to a configured URL, fire-and-forget.
#[derive(Clone)]
pub struct WebhookSink {
  client: reqwest::Client,
  url: String,
}

impl WebhookSink {
  /// Build the sink if a webhook URL is configured; otherwise return None.
  pub fn from_config(cfg: &NotificationsCfg) -> Option<Self> {
    let url = cfg.webhook_url.clone().filter(|u| !u.trim().is_empty())?;
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .map_err(|e| error!(target: "notify", error = %e, "Failed to build webhook client"))
      .ok()?;
    Some(Self { client, url })
  }

  async fn post(&self, n: &Notification) -> Result<(), reqwest::Error> {
    self.client
      .post(&self.url)
      .header(USER_AGENT, "quest-admin/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(n)
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

impl NotificationSink for WebhookSink {
  fn notify(&self, n: Notification) {
    // Outside a runtime (e.g. sync tests) there is nothing to deliver on.
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
      warn!(target: "notify", title = %n.title, "No runtime; webhook notification dropped");
      return;
    };
    let sink = self.clone();
    handle.spawn(async move {
      if let Err(e) = sink.post(&n).await {
        warn!(target: "notify", url = %sink.url, error = %e, "Webhook delivery failed");
      }
    });
  }
}

/// Delivers to every inner sink in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
  sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
  pub fn new() -> Self { Self::default() }

  pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
    self.sinks.push(sink);
    self
  }
}

impl NotificationSink for FanoutSink {
  fn notify(&self, n: Notification) {
    for s in &self.sinks {
      s.notify(n.clone());
    }
  }
}

/// Keeps everything it receives; used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
  seen: std::sync::Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl MemorySink {
  pub fn take(&self) -> Vec<Notification> {
    self.seen.lock().map(|mut v| std::mem::take(&mut *v)).unwrap_or_default()
  }
}

#[cfg(test)]
impl NotificationSink for MemorySink {
  fn notify(&self, n: Notification) {
    if let Ok(mut v) = self.seen.lock() {
      v.push(n);
    }
  }
}

/// Sink stack for a configuration: always tracing, plus the webhook when configured.
pub fn from_config(cfg: &NotificationsCfg) -> Arc<dyn NotificationSink> {
  let mut fan = FanoutSink::new().with(Arc::new(TracingSink));
  if let Some(hook) = WebhookSink::from_config(cfg) {
    info!(target: "quest_admin", url = %hook.url, "Webhook notifications enabled");
    fan = fan.with(Arc::new(hook));
  }
  Arc::new(fan)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fanout_reaches_every_sink() {
    let a = Arc::new(MemorySink::default());
    let b = Arc::new(MemorySink::default());
    let fan = FanoutSink::new().with(a.clone()).with(b.clone()).with(Arc::new(TracingSink));
    fan.notify(Notification::success("Saved", "Question 3 saved"));
    assert_eq!(a.take().len(), 1);
    assert_eq!(b.take()[0].title, "Saved");
  }

  #[test]
  fn webhook_needs_a_url() {
    assert!(WebhookSink::from_config(&NotificationsCfg::default()).is_none());
    let blank = NotificationsCfg { webhook_url: Some("  ".into()), ..Default::default() };
    assert!(WebhookSink::from_config(&blank).is_none());
    let cfg = NotificationsCfg { webhook_url: Some("http://127.0.0.1:9/hook".into()), ..Default::default() };
    assert!(WebhookSink::from_config(&cfg).is_some());
  }

  #[test]
  fn webhook_without_runtime_drops_quietly() {
    let cfg = NotificationsCfg { webhook_url: Some("http://127.0.0.1:9/hook".into()), ..Default::default() };
    let hook = WebhookSink::from_config(&cfg).unwrap();
    hook.notify(Notification::error("Save failed", "node 9 not found"));
  }

  #[test]
  fn default_stack_is_tracing_only() {
    let sink = from_config(&NotificationsCfg::default());
    sink.notify(Notification::new(Severity::Warning, "Heads up", "nothing to see"));
  }

  #[test]
  fn severity_serializes_snake_case() {
    let n = Notification::new(Severity::Warning, "t", "m");
    let v = serde_json::to_value(&n).unwrap();
    assert_eq!(v["severity"], "warning");
  }
}
