use tracing::{debug, warn};

use super::error::MonitorError;
use super::event::ResourceId;
use super::session::Session;
use super::telemetry::event::TelemetryEvent;
use super::telemetry::recorder::TelemetryRecorder;
use crate::host::{Browser, ProbeParams};

/// Best-effort probe injection. A rejected injection is logged and reported back so the
/// caller can lean on the retry slot; it never reaches the command caller.
pub async fn inject(
    browser: &dyn Browser,
    session: &Session,
    telemetry: &mut TelemetryRecorder,
) -> Result<(), MonitorError> {
    let resource = session.resource;
    let params = ProbeParams {
        quantity: session.config.quantity,
    };

    match browser.inject_probe(resource, params).await {
        Ok(()) => {
            debug!(%resource, session = %session.id, "probe dispatched");
            telemetry.record(TelemetryEvent::ProbeDispatched { resource });
            Ok(())
        }
        Err(e) => {
            let err = MonitorError::ProbeInjectionFailed(e);
            warn!(%resource, session = %session.id, "{}", err);
            telemetry.record(TelemetryEvent::ProbeInjectionFailed { resource });
            Err(err)
        }
    }
}

/// STALE REJECTION: a report is only ours if it names the tab we own right now.
pub fn correlate(
    session: Option<&Session>,
    resource: ResourceId,
    telemetry: &mut TelemetryRecorder,
) -> Result<(), MonitorError> {
    match session {
        Some(session) if session.resource == resource => Ok(()),
        _ => {
            let err = MonitorError::StaleProbeResult(resource);
            debug!("{}", err);
            telemetry.record(TelemetryEvent::StaleResultDropped { resource });
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BrowserCall, SimulatedBrowser};
    use crate::kernel::config::MonitorConfig;

    #[tokio::test]
    async fn test_inject_passes_quantity() {
        let browser = SimulatedBrowser::new();
        let resource = browser.open_tab("https://x.test/p").await.unwrap();
        let session = Session::new(resource, MonitorConfig::new("https://x.test/p", 5.0, 3));
        let mut telemetry = TelemetryRecorder::new();

        inject(&browser, &session, &mut telemetry).await.unwrap();
        assert_eq!(
            browser.calls().last(),
            Some(&BrowserCall::Inject(resource, ProbeParams { quantity: 3 }))
        );
        assert_eq!(telemetry.snapshot().probe_stats.dispatched, 1);
    }

    #[tokio::test]
    async fn test_inject_failure_is_absorbed() {
        let browser = SimulatedBrowser::new();
        let resource = browser.open_tab("https://x.test/p").await.unwrap();
        browser.fail_inject(true);
        let session = Session::new(resource, MonitorConfig::new("https://x.test/p", 5.0, 1));
        let mut telemetry = TelemetryRecorder::new();

        let err = inject(&browser, &session, &mut telemetry).await.unwrap_err();
        assert!(matches!(err, MonitorError::ProbeInjectionFailed(_)));
        assert_eq!(telemetry.snapshot().probe_stats.injection_failures, 1);
    }

    #[test]
    fn test_correlate_rejects_foreign_and_orphaned() {
        let session = Session::new(ResourceId(4), MonitorConfig::new("https://x.test/p", 5.0, 1));
        let mut telemetry = TelemetryRecorder::new();

        assert!(correlate(Some(&session), ResourceId(4), &mut telemetry).is_ok());
        assert!(correlate(Some(&session), ResourceId(5), &mut telemetry).is_err());
        assert!(correlate(None, ResourceId(4), &mut telemetry).is_err());
        assert_eq!(telemetry.snapshot().probe_stats.stale_results, 2);
    }
}
