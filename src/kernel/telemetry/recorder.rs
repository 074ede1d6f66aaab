use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

const MAX_EVENTS: usize = 10_000;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(256),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::event::ResourceId;
    use crate::kernel::telemetry::event::SessionOutcome;

    #[test]
    fn test_snapshot_counts_outcomes() {
        let mut recorder = TelemetryRecorder::new();
        let resource = ResourceId(1);
        recorder.record(TelemetryEvent::SessionStarted { resource });
        recorder.record(TelemetryEvent::ProbeDispatched { resource });
        recorder.record(TelemetryEvent::RetryArmed { delay_ms: 5_000 });
        recorder.record(TelemetryEvent::SessionEnded {
            resource,
            outcome: SessionOutcome::OutOfStock,
            attempts: 3,
        });
        recorder.record(TelemetryEvent::SessionStarted { resource });
        recorder.record(TelemetryEvent::SessionEnded {
            resource,
            outcome: SessionOutcome::Stopped,
            attempts: 1,
        });

        let snap = recorder.snapshot();
        assert_eq!(snap.session_stats.started, 2);
        assert_eq!(snap.session_stats.out_of_stock, 1);
        assert_eq!(snap.session_stats.stopped, 1);
        assert_eq!(snap.session_stats.avg_attempts, 2.0);
        assert_eq!(snap.probe_stats.dispatched, 1);
        assert_eq!(snap.probe_stats.retries_armed, 1);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let mut recorder = TelemetryRecorder::new();
        for _ in 0..(MAX_EVENTS + 10) {
            recorder.record(TelemetryEvent::RetryFired);
        }
        assert_eq!(recorder.events().count(), MAX_EVENTS);
        recorder.clear();
        assert_eq!(recorder.snapshot(), TelemetrySnapshot::default());
    }
}
