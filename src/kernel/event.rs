use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::config::MonitorConfig;
use super::error::MonitorError;
use super::state::MonitorState;

/// Opaque handle the host hands out for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Available,
    OutOfStock,
    NotFound,
}

/// What the probe did with the purchase control once the page was available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    AttemptedSucceeded,
    AttemptedFailed,
    NotAttempted,
}

impl PurchaseOutcome {
    pub fn attempted(self) -> bool {
        !matches!(self, PurchaseOutcome::NotAttempted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub status: ProbeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase: Option<PurchaseOutcome>,
}

impl ProbeReport {
    pub fn not_found() -> Self {
        Self { status: ProbeStatus::NotFound, purchase: None }
    }

    pub fn out_of_stock() -> Self {
        Self { status: ProbeStatus::OutOfStock, purchase: None }
    }

    pub fn available(purchase: Option<PurchaseOutcome>) -> Self {
        Self { status: ProbeStatus::Available, purchase }
    }
}

/// Reply for `GET_STATE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: MonitorState,
    pub config: MonitorConfig,
}

/// Requests from the control surface. Each carries its reply channel.
#[derive(Debug)]
pub enum Command {
    Start {
        config: MonitorConfig,
        reply: oneshot::Sender<Result<MonitorState, MonitorError>>,
    },
    Stop {
        reply: oneshot::Sender<MonitorState>,
    },
    GetState {
        reply: oneshot::Sender<Snapshot>,
    },
}

/// Everything the reactor consumes. Delivered on one channel, handled one at a time.
#[derive(Debug)]
pub enum Event {
    Command(Command),
    /// Host finished loading `url` in the main frame of `resource`.
    ResourceNavigated { resource: ResourceId, url: String },
    /// Host reports the tab is gone (closed by the user or crashed).
    ResourceGone { resource: ResourceId },
    /// Probe findings, tagged with the tab they came from.
    ProbeResult { resource: ResourceId, report: ProbeReport },
    /// Scheduler slot elapsed.
    RetryDue { generation: u64 },
}
