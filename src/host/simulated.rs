use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{Browser, ProbeParams};
use crate::kernel::error::HostError;
use crate::kernel::event::{Event, ResourceId};

/// A call the reactor made against the host, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCall {
    Open(String),
    Navigate(ResourceId, String),
    Reload(ResourceId),
    Inject(ResourceId, ProbeParams),
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    tabs: HashMap<ResourceId, String>,
    calls: Vec<BrowserCall>,
    fail_open: bool,
    fail_inject: bool,
    fail_navigate: bool,
}

/// In-process stand-in for a real browser.
///
/// Records every call. With an event sink attached, opening, navigating and reloading a
/// tab immediately report a completed load, and closing one reports it gone, the way a
/// browser's navigation/tab listeners would.
#[derive(Default)]
pub struct SimulatedBrowser {
    inner: Mutex<Inner>,
    events: Option<mpsc::Sender<Event>>,
}

impl SimulatedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load_events(events: mpsc::Sender<Event>) -> Self {
        Self {
            inner: Mutex::default(),
            events: Some(events),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            if let Err(e) = tx.try_send(event) {
                warn!("simulated host dropped event: {}", e);
            }
        }
    }

    pub fn fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    pub fn fail_inject(&self, fail: bool) {
        self.lock().fail_inject = fail;
    }

    pub fn fail_navigate(&self, fail: bool) {
        self.lock().fail_navigate = fail;
    }

    /// Closes the tab as a user would. Returns false if it was not open.
    pub fn close_tab(&self, resource: ResourceId) -> bool {
        let removed = self.lock().tabs.remove(&resource).is_some();
        if removed {
            debug!(%resource, "simulated tab closed");
            self.emit(Event::ResourceGone { resource });
        }
        removed
    }

    pub fn calls(&self) -> Vec<BrowserCall> {
        self.lock().calls.clone()
    }

    pub fn open_tabs(&self) -> Vec<ResourceId> {
        let mut tabs: Vec<_> = self.lock().tabs.keys().copied().collect();
        tabs.sort_by_key(|id| id.0);
        tabs
    }

    pub fn tab_url(&self, resource: ResourceId) -> Option<String> {
        self.lock().tabs.get(&resource).cloned()
    }
}

#[async_trait]
impl Browser for SimulatedBrowser {
    async fn open_tab(&self, url: &str) -> Result<ResourceId, HostError> {
        let resource = {
            let mut inner = self.lock();
            inner.calls.push(BrowserCall::Open(url.to_string()));
            if inner.fail_open {
                return Err(HostError::TabCreation("host refused to open a tab".to_string()));
            }
            inner.next_id += 1;
            let resource = ResourceId(inner.next_id);
            inner.tabs.insert(resource, url.to_string());
            resource
        };
        self.emit(Event::ResourceNavigated { resource, url: url.to_string() });
        Ok(resource)
    }

    async fn navigate(&self, resource: ResourceId, url: &str) -> Result<(), HostError> {
        {
            let mut inner = self.lock();
            inner.calls.push(BrowserCall::Navigate(resource, url.to_string()));
            if inner.fail_navigate {
                return Err(HostError::Navigation("navigation blocked by the page".to_string()));
            }
            match inner.tabs.get_mut(&resource) {
                Some(current) => *current = url.to_string(),
                None => return Err(HostError::TabNotFound(resource)),
            }
        }
        self.emit(Event::ResourceNavigated { resource, url: url.to_string() });
        Ok(())
    }

    async fn reload(&self, resource: ResourceId) -> Result<(), HostError> {
        let url = {
            let mut inner = self.lock();
            inner.calls.push(BrowserCall::Reload(resource));
            inner.tabs.get(&resource).cloned().ok_or(HostError::TabNotFound(resource))?
        };
        self.emit(Event::ResourceNavigated { resource, url });
        Ok(())
    }

    async fn inject_probe(
        &self,
        resource: ResourceId,
        params: ProbeParams,
    ) -> Result<(), HostError> {
        let mut inner = self.lock();
        inner.calls.push(BrowserCall::Inject(resource, params));
        if inner.fail_inject {
            return Err(HostError::Injection("cannot access contents of the page".to_string()));
        }
        if !inner.tabs.contains_key(&resource) {
            return Err(HostError::TabNotFound(resource));
        }
        Ok(())
    }
}
