use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::outputs::{FanoutNotifier, LogNotifier, Notifier, WebhookNotifier};
use crate::store::{JsonFileStore, MemoryStore, StateStore};

pub const STATE_DIR_VAR: &str = "STOCKWATCH_STATE_DIR";
pub const WEBHOOK_URL_VAR: &str = "STOCKWATCH_WEBHOOK_URL";
pub const CHANNEL_CAPACITY_VAR: &str = "STOCKWATCH_CHANNEL_CAPACITY";

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Process-level settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Where the JSON records live. None keeps them in memory.
    pub state_dir: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub channel_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_dir: None,
            webhook_url: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let channel_capacity = match non_empty(CHANNEL_CAPACITY_VAR) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(value = %raw, "ignoring invalid {}", CHANNEL_CAPACITY_VAR);
                    DEFAULT_CHANNEL_CAPACITY
                }
            },
            None => DEFAULT_CHANNEL_CAPACITY,
        };

        Self {
            state_dir: non_empty(STATE_DIR_VAR).map(PathBuf::from),
            webhook_url: non_empty(WEBHOOK_URL_VAR),
            channel_capacity,
        }
    }

    pub fn build_store(&self) -> Arc<dyn StateStore> {
        match &self.state_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "persisting records to disk");
                Arc::new(JsonFileStore::new(dir.clone()))
            }
            None => Arc::new(MemoryStore::new()),
        }
    }

    pub fn build_notifier(&self) -> Arc<dyn Notifier> {
        let mut fanout = FanoutNotifier::new().with(Arc::new(LogNotifier));
        if let Some(url) = &self.webhook_url {
            info!(url = %url, "webhook notifications enabled");
            fanout = fanout.with(Arc::new(WebhookNotifier::new(url.clone())));
        }
        Arc::new(fanout)
    }
}
