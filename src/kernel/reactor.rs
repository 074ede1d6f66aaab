use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::MonitorConfig;
use super::error::MonitorError;
use super::event::{Command, Event, ProbeReport, ProbeStatus, PurchaseOutcome, ResourceId, Snapshot};
use super::probe;
use super::resource::{NavigationDecision, ResourceManager};
use super::scheduler::RetryScheduler;
use super::session::{confirmation_locator, Phase};
use super::state::{MonitorState, StateDelta};
use super::telemetry::event::{SessionOutcome, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use crate::host::Browser;
use crate::outputs::{self, Notification, Notifier, StatePublisher};
use crate::store::StateStore;

/// External collaborators the reactor drives.
pub struct Collaborators {
    pub browser: Arc<dyn Browser>,
    pub store: Arc<dyn StateStore>,
    pub notifier: Arc<dyn Notifier>,
    pub publisher: StatePublisher,
}

/// The monitoring orchestrator.
///
/// Owns the session, the retry slot and the live `MonitorState`. Every signal
/// (commands, load completions, tab closures, probe reports, timer fires) arrives as an
/// [`Event`] on one queue and is handled to completion before the next one, so handlers
/// never interleave.
pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    pub state: MonitorState,
    pub config: MonitorConfig,
    pub scheduler: RetryScheduler,
    pub resources: ResourceManager,
    pub telemetry: TelemetryRecorder,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    publisher: StatePublisher,
}

impl Reactor {
    /// `tx` must feed `receiver`; the retry slot posts its fires through it.
    pub fn new(
        receiver: mpsc::Receiver<Event>,
        tx: mpsc::Sender<Event>,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators { browser, store, notifier, publisher } = collaborators;
        Self {
            receiver,
            state: MonitorState::default(),
            config: MonitorConfig::default(),
            scheduler: RetryScheduler::new(tx),
            resources: ResourceManager::new(browser),
            telemetry: TelemetryRecorder::new(),
            store,
            notifier,
            publisher,
        }
    }

    /// Restores the last config and unconditionally resets persisted state: a tab
    /// handle from a previous process cannot be trusted.
    pub async fn boot(&mut self) {
        match self.store.load_config().await {
            Ok(config) => self.config = config,
            Err(e) => warn!("could not load config, using defaults: {}", e),
        }
        self.state = MonitorState::default();
        if let Err(e) = self.store.save_state(&self.state).await {
            warn!("could not reset persisted state: {}", e);
        }
        info!("reactor booted");
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        self.boot().await;
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("reactor shutting down");
                    break;
                }
                event = self.receiver.recv() => event,
            };
            match event {
                Some(event) => self.handle(event).await,
                None => break,
            }
        }
        self.scheduler.cancel();
    }

    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Command(command) => self.handle_command(command).await,
            Event::ResourceNavigated { resource, url } => self.on_navigated(resource, &url).await,
            Event::ResourceGone { resource } => self.on_gone(resource).await,
            Event::ProbeResult { resource, report } => self.on_probe_result(resource, report).await,
            Event::RetryDue { generation } => self.on_retry_due(generation).await,
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { config, reply } => {
                let result = self.start(config).await;
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                let state = self.stop().await;
                let _ = reply.send(state);
            }
            Command::GetState { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            config: self.config.clone(),
        }
    }

    /// `START`: replaces any running session with a fresh one on a new tab.
    pub async fn start(&mut self, config: MonitorConfig) -> Result<MonitorState, MonitorError> {
        config.validate()?;

        if self.resources.owned().is_some() {
            self.teardown(SessionOutcome::Stopped).await;
        }

        let resource = self.resources.acquire(config.clone()).await?;

        if let Err(e) = self.store.save_config(&config).await {
            warn!("could not persist config: {}", e);
        }
        self.config = config;

        self.telemetry.record(TelemetryEvent::SessionStarted { resource });
        self.apply(StateDelta::SessionStarted { resource, at: Utc::now() }).await;
        info!(
            %resource,
            url = %self.config.url,
            interval = self.config.interval_seconds,
            "monitoring started"
        );
        Ok(self.state.clone())
    }

    /// `STOP`: idempotent, always ends in the idle state.
    pub async fn stop(&mut self) -> MonitorState {
        self.teardown(SessionOutcome::Stopped).await;
        self.state.clone()
    }

    async fn on_navigated(&mut self, resource: ResourceId, url: &str) {
        match self.resources.classify_navigation(resource, url) {
            NavigationDecision::Probe => self.dispatch_probe().await,
            NavigationDecision::Confirmation => {
                info!(%resource, url, "confirmation surface reached");
                self.apply(StateDelta::ConfirmationReached).await;
                self.notify(
                    "Ready for checkout!",
                    "You are now on the checkout page. Complete your purchase!",
                );
                self.end_session(SessionOutcome::Confirmed).await;
            }
            NavigationDecision::Ignore => {}
        }
    }

    async fn dispatch_probe(&mut self) {
        if !self.state.is_monitoring {
            return;
        }
        let Some(session) = self.resources.session_mut() else {
            return;
        };
        session.phase = Phase::Probing;
        let session = session.clone();

        let browser = Arc::clone(self.resources.browser());
        if probe::inject(browser.as_ref(), &session, &mut self.telemetry).await.is_err() {
            if let Some(session) = self.resources.session_mut() {
                session.phase = Phase::AwaitingLoad;
            }
            // Self-heal through the retry slot; the tab may look different next time.
            if !self.scheduler.is_pending() {
                self.arm_retry();
            }
        }
    }

    async fn on_gone(&mut self, resource: ResourceId) {
        if self.resources.on_resource_gone(resource) {
            warn!("{}", MonitorError::ResourceLost(resource));
            self.teardown(SessionOutcome::ResourceLost).await;
        }
    }

    async fn on_probe_result(&mut self, resource: ResourceId, report: ProbeReport) {
        if probe::correlate(self.resources.session(), resource, &mut self.telemetry).is_err() {
            return;
        }
        let Some(session) = self.resources.session_mut() else {
            return;
        };
        if session.phase != Phase::Probing {
            // Exactly one outcome per probe cycle.
            debug!(%resource, phase = ?session.phase, "report outside a probe cycle dropped");
            return;
        }
        session.phase = Phase::AwaitingLoad;

        debug!(%resource, status = ?report.status, purchase = ?report.purchase, "probe report");
        match report.status {
            ProbeStatus::NotFound => self.on_not_found().await,
            ProbeStatus::OutOfStock => self.on_out_of_stock().await,
            ProbeStatus::Available => self.on_available(resource, report.purchase).await,
        }
    }

    async fn on_not_found(&mut self) {
        self.apply(StateDelta::ProbeMissed { at: Utc::now() }).await;
        // Expected steady state: no notification.
        if self.state.is_monitoring && self.resources.owned().is_some() {
            self.arm_retry();
        }
    }

    async fn on_out_of_stock(&mut self) {
        self.apply(StateDelta::OutOfStock { at: Utc::now() }).await;
        self.notify("Item Out of Stock", "The product page exists but shows out of stock.");
        self.end_session(SessionOutcome::OutOfStock).await;
    }

    async fn on_available(&mut self, resource: ResourceId, purchase: Option<PurchaseOutcome>) {
        self.apply(StateDelta::Available { at: Utc::now(), outcome: purchase }).await;
        self.scheduler.cancel();

        match purchase {
            Some(PurchaseOutcome::AttemptedSucceeded) => {
                self.notify("Added to Cart!", "The product was automatically added to your cart!");
                self.await_confirmation(resource).await;
            }
            Some(PurchaseOutcome::AttemptedFailed) => {
                self.notify(
                    "Product Available!",
                    "Product is available but auto-click failed. Check the tab.",
                );
                self.end_session(SessionOutcome::Available).await;
            }
            Some(PurchaseOutcome::NotAttempted) | None => {
                self.notify(
                    "Product Available!",
                    "The product has an \"Add to Cart\" button - it may be available!",
                );
                self.end_session(SessionOutcome::Available).await;
            }
        }
    }

    /// Sends the tab to the confirmation surface and keeps the session alive to watch for it.
    async fn await_confirmation(&mut self, resource: ResourceId) {
        let Some(locator) = confirmation_locator(&self.config.url) else {
            warn!(url = %self.config.url, "no origin to derive a confirmation page from");
            self.end_session(SessionOutcome::Purchased).await;
            return;
        };

        if let Some(session) = self.resources.session_mut() {
            session.phase = Phase::AwaitingConfirmation;
            session.confirmation = Some(locator.clone());
        }

        let browser = Arc::clone(self.resources.browser());
        if let Err(e) = browser.navigate(resource, &locator).await {
            warn!(%resource, "navigation to confirmation page failed: {}", e);
            self.end_session(SessionOutcome::Purchased).await;
        }
    }

    async fn on_retry_due(&mut self, generation: u64) {
        if !self.scheduler.fire(generation) {
            return;
        }
        self.telemetry.record(TelemetryEvent::RetryFired);

        let Some(session) = self.resources.session_mut() else {
            return;
        };
        session.phase = Phase::AwaitingLoad;
        let resource = session.resource;

        let browser = Arc::clone(self.resources.browser());
        if let Err(e) = browser.reload(resource).await {
            warn!(%resource, "reload failed, treating tab as gone: {}", e);
            self.teardown(SessionOutcome::ResourceLost).await;
        }
    }

    fn arm_retry(&mut self) {
        let delay = self.config.interval();
        self.scheduler.schedule(delay);
        self.telemetry.record(TelemetryEvent::RetryArmed {
            delay_ms: delay.as_millis() as u64,
        });
    }

    /// Terminal business outcome: drop the tab and the retry slot, keep the outcome fields.
    async fn end_session(&mut self, outcome: SessionOutcome) {
        self.scheduler.cancel();
        if let Some(session) = self.resources.release() {
            self.telemetry.record(TelemetryEvent::SessionEnded {
                resource: session.resource,
                outcome,
                attempts: self.state.attempt_count,
            });
            info!(
                resource = %session.resource,
                ?outcome,
                attempts = self.state.attempt_count,
                "session ended"
            );
        }
        self.apply(StateDelta::SessionEnded).await;
    }

    /// Stop or resource loss: back to idle with nothing retained.
    async fn teardown(&mut self, outcome: SessionOutcome) {
        self.scheduler.cancel();
        if let Some(session) = self.resources.release() {
            self.telemetry.record(TelemetryEvent::SessionEnded {
                resource: session.resource,
                outcome,
                attempts: self.state.attempt_count,
            });
            info!(resource = %session.resource, ?outcome, "session torn down");
        }
        self.apply(StateDelta::Reset).await;
    }

    /// Reduce, persist, broadcast. Persistence failure leaves memory authoritative.
    async fn apply(&mut self, delta: StateDelta) {
        self.state.reduce(delta);
        if let Err(e) = self.store.save_state(&self.state).await {
            warn!("{}", MonitorError::from(e));
        }
        self.publisher.publish(&self.state);
    }

    fn notify(&self, title: &str, message: &str) {
        outputs::dispatch(&self.notifier, Notification::new(title, message));
    }
}
