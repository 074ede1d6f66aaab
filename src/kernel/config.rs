use serde::{Deserialize, Serialize};
use url::Url;

use super::error::MonitorError;

pub const INTERVAL_MIN_SECS: f64 = 0.5;
pub const INTERVAL_MAX_SECS: f64 = 3600.0;
pub const INTERVAL_DEFAULT_SECS: f64 = 5.0;

pub const QUANTITY_MIN: u32 = 1;
pub const QUANTITY_MAX: u32 = 99;
pub const QUANTITY_DEFAULT: u32 = 1;

/// Operator intent for one session. Persisted independently of live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub url: String,
    pub interval_seconds: f64,
    pub quantity: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval_seconds: INTERVAL_DEFAULT_SECS,
            quantity: QUANTITY_DEFAULT,
        }
    }
}

impl MonitorConfig {
    pub fn new(url: impl Into<String>, interval_seconds: f64, quantity: u32) -> Self {
        Self {
            url: url.into(),
            interval_seconds,
            quantity,
        }
    }

    /// Pulls interval and quantity into their bounds.
    /// Garbage intervals fall back to the default.
    pub fn clamped(mut self) -> Self {
        self.url = self.url.trim().to_string();
        let interval = self.interval_seconds;
        self.interval_seconds = if interval.is_finite() && interval > 0.0 {
            interval.clamp(INTERVAL_MIN_SECS, INTERVAL_MAX_SECS)
        } else {
            INTERVAL_DEFAULT_SECS
        };
        self.quantity = if self.quantity == 0 {
            QUANTITY_DEFAULT
        } else {
            self.quantity.min(QUANTITY_MAX)
        };
        self
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.url.trim().is_empty() {
            return Err(MonitorError::InvalidConfig("url is empty".to_string()));
        }
        let parsed = Url::parse(&self.url)
            .map_err(|e| MonitorError::InvalidConfig(format!("url {:?}: {}", self.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MonitorError::InvalidConfig(format!(
                "unsupported scheme {:?}",
                parsed.scheme()
            )));
        }
        if !(INTERVAL_MIN_SECS..=INTERVAL_MAX_SECS).contains(&self.interval_seconds) {
            return Err(MonitorError::InvalidConfig(format!(
                "interval {}s outside [{}, {}]",
                self.interval_seconds, INTERVAL_MIN_SECS, INTERVAL_MAX_SECS
            )));
        }
        if !(QUANTITY_MIN..=QUANTITY_MAX).contains(&self.quantity) {
            return Err(MonitorError::InvalidConfig(format!(
                "quantity {} outside [{}, {}]",
                self.quantity, QUANTITY_MIN, QUANTITY_MAX
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.interval_seconds)
    }
}
