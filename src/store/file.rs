use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use super::{StateStore, CONFIG_KEY, STATE_KEY};
use crate::kernel::config::MonitorConfig;
use crate::kernel::error::StoreError;
use crate::kernel::state::MonitorState;

/// One pretty-printed JSON file per record under `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match fs::read_to_string(self.path(key)).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes through a temp file so a crash never leaves half a record behind.
    async fn write<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(value)?;
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "record written");
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load_config(&self) -> Result<MonitorConfig, StoreError> {
        self.read(CONFIG_KEY).await
    }

    async fn save_config(&self, config: &MonitorConfig) -> Result<(), StoreError> {
        self.write(CONFIG_KEY, config).await
    }

    async fn load_state(&self) -> Result<MonitorState, StoreError> {
        self.read(STATE_KEY).await
    }

    async fn save_state(&self, state: &MonitorState) -> Result<(), StoreError> {
        self.write(STATE_KEY, state).await
    }
}
