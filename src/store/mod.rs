//! Persistence for the two records: operator config and live state.

pub mod file;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::kernel::config::MonitorConfig;
use crate::kernel::error::StoreError;
use crate::kernel::state::MonitorState;

pub use file::JsonFileStore;

pub const CONFIG_KEY: &str = "monitor_config";
pub const STATE_KEY: &str = "monitor_state";

/// Key-value store for the config and state records. Missing records read as defaults.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_config(&self) -> Result<MonitorConfig, StoreError>;
    async fn save_config(&self, config: &MonitorConfig) -> Result<(), StoreError>;
    async fn load_state(&self) -> Result<MonitorState, StoreError>;
    async fn save_state(&self, state: &MonitorState) -> Result<(), StoreError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: RwLock<Option<MonitorConfig>>,
    state: RwLock<Option<MonitorState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_config(&self) -> Result<MonitorConfig, StoreError> {
        Ok(self.config.read().await.clone().unwrap_or_default())
    }

    async fn save_config(&self, config: &MonitorConfig) -> Result<(), StoreError> {
        *self.config.write().await = Some(config.clone());
        Ok(())
    }

    async fn load_state(&self) -> Result<MonitorState, StoreError> {
        Ok(self.state.read().await.clone().unwrap_or_default())
    }

    async fn save_state(&self, state: &MonitorState) -> Result<(), StoreError> {
        *self.state.write().await = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_defaults_then_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.load_config().await.unwrap(), MonitorConfig::default());
        assert_eq!(store.load_state().await.unwrap(), MonitorState::default());

        let config = MonitorConfig::new("https://x.test/p", 2.5, 4);
        store.save_config(&config).await.unwrap();
        assert_eq!(store.load_config().await.unwrap(), config);
    }
}
