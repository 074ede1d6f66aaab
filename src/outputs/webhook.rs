use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use super::{Notification, Notifier};

const TIMEOUT_SECS: u64 = 5;

/// POSTs each notification as JSON to a fixed endpoint.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    message: &'a str,
    source: &'static str,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        let client = match Client::builder().timeout(Duration::from_secs(TIMEOUT_SECS)).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("webhook client falls back to defaults without a timeout: {}", e);
                Client::new()
            }
        };
        Self::with_client(client, url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let payload = WebhookPayload {
            title: &notification.title,
            message: &notification.message,
            source: "stockwatch",
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("posting to {}", self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!("webhook returned {}", response.status()));
        }
        Ok(())
    }
}
