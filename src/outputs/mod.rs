//! Notification and broadcast layer. Everything here is fire-and-forget: a failure
//! is logged and never feeds back into the state machine.

pub mod text;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::kernel::state::MonitorState;

pub use text::LogNotifier;
pub use webhook::WebhookNotifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Sends to every inner notifier; one failing does not stop the rest.
#[derive(Default)]
pub struct FanoutNotifier {
    inner: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.inner.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        for notifier in &self.inner {
            if let Err(e) = notifier.notify(notification).await {
                warn!("notifier failed: {:#}", e);
            }
        }
        Ok(())
    }
}

/// Forwards notifications into a channel, for a UI layer or a test to drain.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        self.tx
            .send(notification.clone())
            .map_err(|_| anyhow::anyhow!("notification receiver dropped"))
    }
}

/// Hands a notification to `notifier` without making the caller wait on it.
pub fn dispatch(notifier: &Arc<dyn Notifier>, notification: Notification) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&notification).await {
            warn!(title = %notification.title, "notification failed: {:#}", e);
        }
    });
}

/// `STATE_UPDATE` broadcast. Publishing with nobody listening is fine.
#[derive(Clone)]
pub struct StatePublisher {
    tx: broadcast::Sender<MonitorState>,
}

impl StatePublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, state: &MonitorState) {
        if self.tx.send(state.clone()).is_err() {
            debug!("no state listeners");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorState> {
        self.tx.subscribe()
    }
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new(64)
    }
}
