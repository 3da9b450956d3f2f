use tokio::sync::broadcast;

/// A data-change signal from elsewhere in the process.
///
/// `KeyChanged` stands in for the storage-mutation event another tab would
/// raise; `DataUpdated` is the payload-free "something changed" signal.
/// Consumers recompute wholesale either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    KeyChanged(String),
    DataUpdated,
}

/// Broadcast fan-out for data-change signals.
///
/// Subscribers that lag may miss events; that is acceptable because every
/// consumer recomputes from storage on each signal, so a missed event is
/// covered by the next one or by the periodic refresh.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Signal that `key` was written. No-op without subscribers.
    pub fn key_changed(&self, key: impl Into<String>) {
        let _ = self.tx.send(ChangeEvent::KeyChanged(key.into()));
    }

    /// Signal an unspecified data change. No-op without subscribers.
    pub fn data_updated(&self) {
        let _ = self.tx.send(ChangeEvent::DataUpdated);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_both_event_kinds() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.key_changed("quizResults");
        notifier.data_updated();

        assert_eq!(
            rx.recv().await.unwrap(),
            ChangeEvent::KeyChanged("quizResults".to_owned())
        );
        assert_eq!(rx.recv().await.unwrap(), ChangeEvent::DataUpdated);
    }

    #[test]
    fn sending_without_subscribers_is_fine() {
        let notifier = ChangeNotifier::new();
        notifier.data_updated();
        notifier.key_changed("students");
    }
}
