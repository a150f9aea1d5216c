//! Cancellable periodic tasks
//!
//! The summary panel re-polls on a fixed interval, but only while its view
//! is active. The task checks the active flag before each tick fires --
//! cooperative cancellation; an already in-flight refresh is never
//! aborted. No backoff on failure: the cadence is time-based.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use admiral_core::prelude::*;

use crate::message::Message;

/// A periodic tick source gated by an active flag.
pub struct PeriodicTask {
    active_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn the ticker. `tick` builds the message sent on each firing;
    /// nothing fires while the active flag is false. The task ends when
    /// the shutdown signal flips or the message channel closes.
    pub fn start(
        interval: Duration,
        msg_tx: mpsc::Sender<Message>,
        tick: impl Fn() -> Message + Send + 'static,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let (active_tx, active_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }
                // Checked at the top of each continuation, not mid-flight.
                if !*active_rx.borrow() {
                    continue;
                }
                if msg_tx.send(tick()).await.is_err() {
                    debug!("message channel closed, stopping periodic task");
                    break;
                }
            }
        });

        Self { active_tx, handle }
    }

    /// Flip the active flag. Ticks scheduled while inactive are skipped.
    pub fn set_active(&self, active: bool) {
        let _ = self.active_tx.send(active);
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_inactive_task_never_ticks() {
        let (msg_tx, mut msg_rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = PeriodicTask::start(
            Duration::from_secs(15),
            msg_tx,
            || Message::SummaryPollTick,
            shutdown_rx,
        );

        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert!(msg_rx.try_recv().is_err());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_task_ticks_on_interval() {
        let (msg_tx, mut msg_rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = PeriodicTask::start(
            Duration::from_secs(15),
            msg_tx,
            || Message::SummaryPollTick,
            shutdown_rx,
        );
        task.set_active(true);

        tokio::time::advance(Duration::from_secs(16)).await;
        tokio::task::yield_now().await;
        assert!(matches!(msg_rx.recv().await, Some(Message::SummaryPollTick)));
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivation_stops_future_ticks() {
        let (msg_tx, mut msg_rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = PeriodicTask::start(
            Duration::from_secs(15),
            msg_tx,
            || Message::SummaryPollTick,
            shutdown_rx,
        );
        task.set_active(true);
        tokio::time::advance(Duration::from_secs(16)).await;
        tokio::task::yield_now().await;
        let _ = msg_rx.recv().await;

        task.set_active(false);
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert!(msg_rx.try_recv().is_err());
        task.abort();
    }
}
