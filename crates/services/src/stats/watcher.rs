use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use portal_core::model::StatsSnapshot;

use super::aggregator::StatsAggregator;
use crate::notify::ChangeNotifier;

/// How often the watcher refreshes when nothing signals a change.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Keeps a published `StatsSnapshot` current.
///
/// One task recomputes wholesale on three triggers: spawn, the periodic
/// interval, and change-notifier events. Snapshots are published through a
/// `watch` channel; `stop` (or drop) cancels the task so no refresh keeps
/// firing after teardown.
#[derive(Debug)]
pub struct StatsWatcher {
    handle: Option<JoinHandle<()>>,
    rx: watch::Receiver<StatsSnapshot>,
}

impl StatsWatcher {
    /// Spawn the refresh task.
    ///
    /// The published value starts as an empty snapshot and is replaced as
    /// soon as the first computation lands.
    #[must_use]
    pub fn spawn(
        aggregator: StatsAggregator,
        notifier: &ChangeNotifier,
        refresh_every: Duration,
    ) -> Self {
        let mut changes = notifier.subscribe();
        let (tx, rx) = watch::channel(StatsSnapshot::empty(aggregator.clock().now()));

        let handle = tokio::spawn(async move {
            let snapshot = aggregator.compute().await;
            let _ = tx.send(snapshot);

            let mut ticker = tokio::time::interval(refresh_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately.
            ticker.tick().await;
            let mut listening = true;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    event = changes.recv(), if listening => match event {
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => {
                            // Notifier went away; periodic refresh only.
                            listening = false;
                            continue;
                        }
                    },
                }
                let snapshot = aggregator.compute().await;
                let _ = tx.send(snapshot);
            }
        });

        Self {
            handle: Some(handle),
            rx,
        }
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> StatsSnapshot {
        self.rx.borrow().clone()
    }

    /// A receiver observing every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StatsSnapshot> {
        self.rx.clone()
    }

    /// Stop refreshing. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for StatsWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
