use thiserror::Error;

use super::event::ResourceId;

/// Failures reported by the browser host.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("tab could not be created: {0}")]
    TabCreation(String),
    #[error("no such tab: {0}")]
    TabNotFound(ResourceId),
    #[error("probe injection rejected: {0}")]
    Injection(String),
    #[error("navigation rejected: {0}")]
    Navigation(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Orchestrator error taxonomy. Only `ResourceCreationFailed` and `InvalidConfig`
/// reach a command caller; the rest are absorbed into state transitions.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(HostError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("owned resource {0} lost")]
    ResourceLost(ResourceId),
    #[error("probe injection failed: {0}")]
    ProbeInjectionFailed(HostError),
    #[error("stale probe result from {0}")]
    StaleProbeResult(ResourceId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("reactor is not running")]
    ReactorClosed,
}
