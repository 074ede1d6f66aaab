use std::sync::Arc;

use tracing::{debug, info};

use super::config::MonitorConfig;
use super::error::MonitorError;
use super::event::ResourceId;
use super::session::{Phase, Session};
use crate::host::Browser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Tab shows the monitored locator: run the probe.
    Probe,
    /// Tab reached the pending confirmation surface.
    Confirmation,
    Ignore,
}

/// Owns the one tab under monitoring, if any.
pub struct ResourceManager {
    browser: Arc<dyn Browser>,
    session: Option<Session>,
}

impl ResourceManager {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Self {
            browser,
            session: None,
        }
    }

    pub fn browser(&self) -> &Arc<dyn Browser> {
        &self.browser
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn owned(&self) -> Option<ResourceId> {
        self.session.as_ref().map(|s| s.resource)
    }

    pub fn owns(&self, resource: ResourceId) -> bool {
        self.owned() == Some(resource)
    }

    /// Opens the tab and takes ownership. Nothing changes on failure.
    /// Callers release any previous session first.
    pub async fn acquire(&mut self, config: MonitorConfig) -> Result<ResourceId, MonitorError> {
        let resource = self
            .browser
            .open_tab(&config.url)
            .await
            .map_err(MonitorError::ResourceCreationFailed)?;

        let session = Session::new(resource, config);
        info!(%resource, session = %session.id, target = session.target(), "resource acquired");
        self.session = Some(session);
        Ok(resource)
    }

    /// Drops ownership. Idempotent; returns the released session.
    pub fn release(&mut self) -> Option<Session> {
        let released = self.session.take();
        if let Some(session) = &released {
            info!(resource = %session.resource, session = %session.id, "resource released");
        }
        released
    }

    /// True when `resource` was ours; the caller tears the session down.
    pub fn on_resource_gone(&self, resource: ResourceId) -> bool {
        let owned = self.owns(resource);
        if !owned {
            debug!(%resource, "ignoring closure of foreign tab");
        }
        owned
    }

    pub fn classify_navigation(&self, resource: ResourceId, url: &str) -> NavigationDecision {
        let Some(session) = self.session.as_ref().filter(|s| s.resource == resource) else {
            return NavigationDecision::Ignore;
        };

        match session.phase {
            Phase::AwaitingConfirmation if session.is_confirmation(url) => {
                NavigationDecision::Confirmation
            }
            Phase::AwaitingConfirmation => NavigationDecision::Ignore,
            Phase::AwaitingLoad | Phase::Probing if session.is_target(url) => {
                NavigationDecision::Probe
            }
            Phase::AwaitingLoad | Phase::Probing => {
                debug!(%resource, url, "navigation left the monitored locator");
                NavigationDecision::Ignore
            }
        }
    }
}
