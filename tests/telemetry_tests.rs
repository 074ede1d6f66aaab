use std::sync::Arc;

use stockwatch::host::SimulatedBrowser;
use stockwatch::kernel::event::{Event, ProbeReport, ResourceId};
use stockwatch::outputs::{LogNotifier, StatePublisher};
use stockwatch::store::MemoryStore;
use stockwatch::{Collaborators, MonitorConfig, Reactor};
use tokio::sync::mpsc;

fn reactor(browser: Arc<SimulatedBrowser>) -> Reactor {
    let (tx, rx) = mpsc::channel(100);
    Reactor::new(
        rx,
        tx,
        Collaborators {
            browser,
            store: Arc::new(MemoryStore::new()),
            notifier: Arc::new(LogNotifier),
            publisher: StatePublisher::default(),
        },
    )
}

async fn loaded(reactor: &mut Reactor, resource: ResourceId) {
    reactor
        .handle(Event::ResourceNavigated { resource, url: "https://x.test/p".to_string() })
        .await;
}

#[tokio::test]
async fn test_session_lifecycle_telemetry() {
    let mut reactor = reactor(Arc::new(SimulatedBrowser::new()));
    let config = MonitorConfig::new("https://x.test/p", 5.0, 1);

    let resource = reactor.start(config.clone()).await.unwrap().owned_resource_id.unwrap();
    loaded(&mut reactor, resource).await;
    reactor.handle(Event::ProbeResult { resource, report: ProbeReport::not_found() }).await;
    let foreign = Event::ProbeResult {
        resource: ResourceId(999),
        report: ProbeReport::available(None),
    };
    reactor.handle(foreign).await;
    loaded(&mut reactor, resource).await;
    reactor.handle(Event::ProbeResult { resource, report: ProbeReport::out_of_stock() }).await;

    reactor.start(config).await.unwrap();
    reactor.stop().await;

    let snapshot = reactor.telemetry.snapshot();
    assert_eq!(snapshot.session_stats.started, 2);
    assert_eq!(snapshot.session_stats.out_of_stock, 1);
    assert_eq!(snapshot.session_stats.stopped, 1);
    assert_eq!(snapshot.session_stats.avg_attempts, 1.5, "Two attempts, then one");
    assert_eq!(snapshot.probe_stats.dispatched, 2);
    assert_eq!(snapshot.probe_stats.stale_results, 1);
    assert_eq!(snapshot.probe_stats.retries_armed, 1);
    assert_eq!(snapshot.probe_stats.retries_fired, 0);
}

#[tokio::test]
async fn test_failure_paths_are_recorded() {
    let browser = Arc::new(SimulatedBrowser::new());
    let mut reactor = reactor(browser.clone());

    browser.fail_inject(true);
    let resource = reactor
        .start(MonitorConfig::new("https://x.test/p", 5.0, 1))
        .await
        .unwrap()
        .owned_resource_id
        .unwrap();
    loaded(&mut reactor, resource).await;

    assert!(browser.close_tab(resource));
    reactor.handle(Event::ResourceGone { resource }).await;

    let snapshot = reactor.telemetry.snapshot();
    assert_eq!(snapshot.probe_stats.injection_failures, 1);
    assert_eq!(snapshot.probe_stats.retries_armed, 1, "Injection failure leans on the retry slot");
    assert_eq!(snapshot.session_stats.resource_lost, 1);
    assert!(reactor.state.is_idle());
}
