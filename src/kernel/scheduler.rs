use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::event::Event;

struct Pending {
    generation: u64,
    task: JoinHandle<()>,
}

/// Single-slot deferred retry. Arming replaces whatever was pending.
///
/// The timer fires by posting `Event::RetryDue` back into the reactor's own queue,
/// so the callback runs on the same consumer as every other event. A fire that was
/// already queued when the slot got cancelled or re-armed carries an old generation
/// and is rejected by [`RetryScheduler::fire`].
pub struct RetryScheduler {
    tx: mpsc::Sender<Event>,
    slot: Option<Pending>,
    generation: u64,
}

impl RetryScheduler {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self {
            tx,
            slot: None,
            generation: 0,
        }
    }

    pub fn schedule(&mut self, delay: Duration) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Reactor gone means nobody is left to retry for
            let _ = tx.send(Event::RetryDue { generation }).await;
        });

        debug!(generation, delay_ms = delay.as_millis() as u64, "retry armed");
        self.slot = Some(Pending { generation, task });
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.slot.take() {
            pending.task.abort();
            debug!(generation = pending.generation, "retry cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// Consumes the slot if `generation` is the armed one.
    pub fn fire(&mut self, generation: u64) -> bool {
        match &self.slot {
            Some(pending) if pending.generation == generation => {
                self.slot = None;
                true
            }
            _ => {
                debug!(generation, "discarded stale retry");
                false
            }
        }
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_once_after_delay() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = RetryScheduler::new(tx);

        let generation = scheduler.schedule(Duration::from_secs(5));
        assert!(scheduler.is_pending());

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert!(rx.try_recv().is_err(), "Should not fire before the delay");

        let event = rx.recv().await.expect("timer event");
        match event {
            Event::RetryDue { generation: g } => assert_eq!(g, generation),
            other => panic!("Unexpected event {:?}", other),
        }
        assert!(scheduler.fire(generation));
        assert!(!scheduler.is_pending());
        assert!(!scheduler.fire(generation), "A slot fires only once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_supersedes_previous() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = RetryScheduler::new(tx);

        let first = scheduler.schedule(Duration::from_secs(1));
        let second = scheduler.schedule(Duration::from_secs(2));
        assert_ne!(first, second);

        tokio::time::advance(Duration::from_secs(3)).await;
        let event = rx.recv().await.expect("timer event");
        assert!(matches!(event, Event::RetryDue { generation } if generation == second));
        assert!(rx.try_recv().is_err(), "Superseded timer must not fire");
        assert!(!scheduler.fire(first));
        assert!(scheduler.fire(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = RetryScheduler::new(tx);

        scheduler.cancel();
        let generation = scheduler.schedule(Duration::from_secs(1));
        scheduler.cancel();
        scheduler.cancel();
        assert!(!scheduler.is_pending());

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert!(!scheduler.fire(generation));
    }
}
