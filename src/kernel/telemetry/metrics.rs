use std::collections::VecDeque;

use super::event::{SessionOutcome, TelemetryEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub session_stats: SessionStats,
    pub probe_stats: ProbeStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub started: u64,
    pub available: u64,
    pub purchased: u64,
    pub confirmed: u64,
    pub out_of_stock: u64,
    pub stopped: u64,
    pub resource_lost: u64,
    pub avg_attempts: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeStats {
    pub dispatched: u64,
    pub injection_failures: u64,
    pub stale_results: u64,
    pub retries_armed: u64,
    pub retries_fired: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    let mut ended = 0u64;
    let mut total_attempts = 0u64;

    for event in events {
        match event {
            TelemetryEvent::SessionStarted { .. } => snap.session_stats.started += 1,
            TelemetryEvent::SessionEnded { outcome, attempts, .. } => {
                ended += 1;
                total_attempts += u64::from(*attempts);
                let stats = &mut snap.session_stats;
                match outcome {
                    SessionOutcome::Available => stats.available += 1,
                    SessionOutcome::Purchased => stats.purchased += 1,
                    SessionOutcome::Confirmed => stats.confirmed += 1,
                    SessionOutcome::OutOfStock => stats.out_of_stock += 1,
                    SessionOutcome::Stopped => stats.stopped += 1,
                    SessionOutcome::ResourceLost => stats.resource_lost += 1,
                }
            }
            TelemetryEvent::ProbeDispatched { .. } => snap.probe_stats.dispatched += 1,
            TelemetryEvent::ProbeInjectionFailed { .. } => snap.probe_stats.injection_failures += 1,
            TelemetryEvent::StaleResultDropped { .. } => snap.probe_stats.stale_results += 1,
            TelemetryEvent::RetryArmed { .. } => snap.probe_stats.retries_armed += 1,
            TelemetryEvent::RetryFired => snap.probe_stats.retries_fired += 1,
        }
    }

    if ended > 0 {
        snap.session_stats.avg_attempts = total_attempts as f64 / ended as f64;
    }

    snap
}
