use serde::{Deserialize, Serialize};

use crate::kernel::event::ResourceId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    SessionStarted {
        resource: ResourceId,
    },

    SessionEnded {
        resource: ResourceId,
        outcome: SessionOutcome,
        attempts: u32,
    },

    ProbeDispatched {
        resource: ResourceId,
    },

    ProbeInjectionFailed {
        resource: ResourceId,
    },

    StaleResultDropped {
        resource: ResourceId,
    },

    RetryArmed {
        delay_ms: u64,
    },

    RetryFired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Available,
    Purchased,
    Confirmed,
    OutOfStock,
    Stopped,
    ResourceLost,
}
