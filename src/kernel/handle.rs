use tokio::sync::{mpsc, oneshot};

use super::config::MonitorConfig;
use super::error::MonitorError;
use super::event::{Command, Event, ProbeReport, ResourceId, Snapshot};
use super::state::MonitorState;

/// Control surface for a running reactor. Cheap to clone.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<Event>,
}

impl MonitorHandle {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, MonitorError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Event::Command(make(reply)))
            .await
            .map_err(|_| MonitorError::ReactorClosed)?;
        rx.await.map_err(|_| MonitorError::ReactorClosed)
    }

    pub async fn start(&self, config: MonitorConfig) -> Result<MonitorState, MonitorError> {
        self.request(|reply| Command::Start { config, reply }).await?
    }

    pub async fn stop(&self) -> Result<MonitorState, MonitorError> {
        self.request(|reply| Command::Stop { reply }).await
    }

    pub async fn get_state(&self) -> Result<Snapshot, MonitorError> {
        self.request(|reply| Command::GetState { reply }).await
    }

    /// Delivery point for the probe's findings.
    pub async fn report_probe(
        &self,
        resource: ResourceId,
        report: ProbeReport,
    ) -> Result<(), MonitorError> {
        self.post(Event::ProbeResult { resource, report }).await
    }

    pub async fn post(&self, event: Event) -> Result<(), MonitorError> {
        self.tx.send(event).await.map_err(|_| MonitorError::ReactorClosed)
    }
}
