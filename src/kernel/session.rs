use url::Url;
use uuid::Uuid;

use super::config::MonitorConfig;
use super::event::ResourceId;

/// Path of the post-purchase page, relative to the target's origin.
pub const CONFIRMATION_PATH: &str = "/s/checkout";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Tab created or reloaded, waiting for the target to finish loading.
    AwaitingLoad,
    /// Probe injected, waiting for its report.
    Probing,
    /// Purchase went through, tab sent to the confirmation surface.
    AwaitingConfirmation,
}

/// Everything one monitoring run owns. Lives only inside the reactor.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub resource: ResourceId,
    pub config: MonitorConfig,
    pub phase: Phase,
    /// Set while a confirmation navigation is outstanding.
    pub confirmation: Option<String>,
}

impl Session {
    pub fn new(resource: ResourceId, config: MonitorConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            resource,
            config,
            phase: Phase::AwaitingLoad,
            confirmation: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.config.url
    }

    /// Navigations only count when they land under the monitored locator.
    pub fn is_target(&self, url: &str) -> bool {
        url.starts_with(self.target())
    }

    /// The confirmation locator itself, or anything below it. `/s/checkout-help` is not.
    pub fn is_confirmation(&self, url: &str) -> bool {
        let Some(rest) = self
            .confirmation
            .as_deref()
            .and_then(|confirmation| url.strip_prefix(confirmation))
        else {
            return false;
        };
        rest.is_empty() || rest.starts_with(['/', '?', '#'])
    }
}

/// `<origin of target>/s/checkout`. None when the target has no usable origin.
pub fn confirmation_locator(target: &str) -> Option<String> {
    let url = Url::parse(target).ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(format!("{}{}", origin.ascii_serialization(), CONFIRMATION_PATH))
}
