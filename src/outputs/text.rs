use async_trait::async_trait;
use tracing::info;

use super::{Notification, Notifier};

/// Writes notifications to the log. Default when nothing else is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(title = %notification.title, "{}", notification.message);
        Ok(())
    }
}
