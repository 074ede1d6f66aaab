use std::sync::Arc;
use std::time::Duration;

use stockwatch::host::{BrowserCall, ProbeParams, SimulatedBrowser};
use stockwatch::kernel::error::MonitorError;
use stockwatch::kernel::event::{Event, ProbeReport, PurchaseOutcome};
use stockwatch::kernel::state::{LastError, MonitorState};
use stockwatch::outputs::{LogNotifier, StatePublisher};
use stockwatch::store::{JsonFileStore, MemoryStore, StateStore};
use stockwatch::{Collaborators, MonitorConfig, MonitorHandle, Reactor};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Running {
    handle: MonitorHandle,
    browser: Arc<SimulatedBrowser>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

// Full loop: the simulated host reports loads and closures on its own.
fn spawn_reactor(store: Arc<dyn StateStore>) -> Running {
    let (tx, rx) = mpsc::channel(100);
    let browser = Arc::new(SimulatedBrowser::with_load_events(tx.clone()));
    let reactor = Reactor::new(
        rx,
        tx.clone(),
        Collaborators {
            browser: browser.clone(),
            store,
            notifier: Arc::new(LogNotifier),
            publisher: StatePublisher::default(),
        },
    );

    let shutdown = CancellationToken::new();
    let task = tokio::spawn(reactor.run(shutdown.clone()));
    Running {
        handle: MonitorHandle::new(tx),
        browser,
        shutdown,
        task,
    }
}

fn injections(browser: &SimulatedBrowser) -> usize {
    browser
        .calls()
        .iter()
        .filter(|c| matches!(c, BrowserCall::Inject(..)))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_available() {
    let running = spawn_reactor(Arc::new(MemoryStore::new()));
    let handle = &running.handle;

    let state = handle.start(MonitorConfig::new("https://x.test/p", 2.0, 3)).await.unwrap();
    let resource = state.owned_resource_id.unwrap();

    // Barrier: the initial load event is queued ahead of this request
    handle.get_state().await.unwrap();
    assert_eq!(
        running.browser.calls().last(),
        Some(&BrowserCall::Inject(resource, ProbeParams { quantity: 3 }))
    );

    for cycle in 1..=3 {
        handle.report_probe(resource, ProbeReport::not_found()).await.unwrap();
        let snapshot = handle.get_state().await.unwrap();
        assert_eq!(snapshot.state.attempt_count, 1 + cycle);
        assert_eq!(snapshot.state.last_error, LastError::NotFound);

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        handle.get_state().await.unwrap();
        assert_eq!(injections(&running.browser), 1 + cycle as usize, "Retry reloads and re-probes");
    }

    handle
        .report_probe(resource, ProbeReport::available(Some(PurchaseOutcome::AttemptedSucceeded)))
        .await
        .unwrap();
    // First barrier: report handled and checkout load queued. Second: checkout load handled.
    handle.get_state().await.unwrap();
    let snapshot = handle.get_state().await.unwrap();
    assert!(snapshot.state.success_detected);
    assert!(snapshot.state.reached_confirmation);
    assert!(!snapshot.state.is_monitoring);
    assert_eq!(snapshot.config.quantity, 3);

    running.shutdown.cancel();
    running.task.await.unwrap();
}

#[tokio::test]
async fn test_closing_tab_resets_state() {
    let running = spawn_reactor(Arc::new(MemoryStore::new()));
    let state = running.handle.start(MonitorConfig::new("https://x.test/p", 5.0, 1)).await.unwrap();
    let resource = state.owned_resource_id.unwrap();

    assert!(running.browser.close_tab(resource));
    let snapshot = running.handle.get_state().await.unwrap();
    assert_eq!(snapshot.state, MonitorState::default());

    running.handle.report_probe(resource, ProbeReport::available(None)).await.unwrap();
    let snapshot = running.handle.get_state().await.unwrap();
    assert!(!snapshot.state.success_detected);

    running.shutdown.cancel();
    running.task.await.unwrap();
}

#[tokio::test]
async fn test_handle_reports_closed_reactor() {
    let running = spawn_reactor(Arc::new(MemoryStore::new()));
    running.shutdown.cancel();
    running.task.await.unwrap();

    let err = running.handle.stop().await.unwrap_err();
    assert!(matches!(err, MonitorError::ReactorClosed));
    let gone = Event::ResourceGone { resource: stockwatch::kernel::event::ResourceId(1) };
    let err = running.handle.post(gone).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn test_boot_resets_persisted_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));

    let config = MonitorConfig::new("https://x.test/p", 7.5, 2);
    store.save_config(&config).await.unwrap();
    let stale = MonitorState {
        is_monitoring: true,
        owned_resource_id: Some(stockwatch::kernel::event::ResourceId(42)),
        attempt_count: 9,
        ..MonitorState::default()
    };
    store.save_state(&stale).await.unwrap();

    let running = spawn_reactor(store.clone());
    let snapshot = running.handle.get_state().await.unwrap();
    assert_eq!(snapshot.state, MonitorState::default(), "Tab handles do not survive restarts");
    assert_eq!(snapshot.config, config, "Config survives restarts");
    assert_eq!(store.load_state().await.unwrap(), MonitorState::default());

    running.shutdown.cancel();
    running.task.await.unwrap();
}
