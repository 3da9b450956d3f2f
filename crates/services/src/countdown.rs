use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// One signal from an armed countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// One second elapsed; carries the remaining time after the decrement.
    Tick { remaining_secs: u32 },
    /// The countdown reached zero. Signalled exactly once, after the final
    /// tick, and the countdown stops on its own.
    Expired,
}

/// Repeating one-second countdown on a spawned task.
///
/// Knows nothing about quizzes: it only decrements and reports through the
/// owner's callback. Arming while armed replaces the previous countdown;
/// dropping cancels whatever is still running.
#[derive(Debug, Default)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Start a countdown of `duration_secs`, reporting each elapsed second
    /// through `on_tick` and signalling expiry once the remainder hits zero.
    pub fn arm<F>(&mut self, duration_secs: u32, mut on_tick: F)
    where
        F: FnMut(TickEvent) + Send + 'static,
    {
        self.cancel();
        let handle = tokio::spawn(async move {
            let mut remaining = duration_secs;
            let mut ticker = time::interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                remaining = remaining.saturating_sub(1);
                on_tick(TickEvent::Tick {
                    remaining_secs: remaining,
                });
                if remaining == 0 {
                    on_tick(TickEvent::Expired);
                    break;
                }
            }
        });
        self.handle = Some(handle);
    }

    /// Stop the countdown. Idempotent; a cancelled countdown never fires
    /// again.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a countdown task is currently attached and running.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
