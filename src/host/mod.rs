//! Host seam: the browser that owns tabs and runs the probe.
//!
//! The reactor never talks to a browser directly. Load completions, tab closures and
//! probe results come back as `Event`s on the reactor queue; these calls only ask the
//! host to do something.

pub mod simulated;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::kernel::error::HostError;
use crate::kernel::event::ResourceId;

pub use simulated::{BrowserCall, SimulatedBrowser};

/// Parameters handed to the probe on injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeParams {
    pub quantity: u32,
}

#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a new foreground tab at `url`.
    async fn open_tab(&self, url: &str) -> Result<ResourceId, HostError>;

    async fn navigate(&self, resource: ResourceId, url: &str) -> Result<(), HostError>;

    async fn reload(&self, resource: ResourceId) -> Result<(), HostError>;

    /// Runs the availability probe in the tab's main frame.
    async fn inject_probe(
        &self,
        resource: ResourceId,
        params: ProbeParams,
    ) -> Result<(), HostError>;
}
