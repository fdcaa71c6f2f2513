//! Edit watcher — re-routes to the validation screen whenever an email is inserted.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::events::{EventBus, OnboardingEvent, SubscriptionId};
use super::intent::{IntentSink, NavigationIntent};

/// Ownership token for a running edit watcher.
///
/// Cancel it with [`EditWatcherHandle::cancel`]. Dropping the handle without
/// cancelling unsubscribes and aborts the task, so the watcher never
/// outlives its owner.
pub struct EditWatcherHandle {
    events: Arc<EventBus>,
    subscription: SubscriptionId,
    handle: Option<JoinHandle<u64>>,
}

impl std::fmt::Debug for EditWatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditWatcherHandle")
            .field("subscription", &self.subscription)
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl EditWatcherHandle {
    /// Stop the watcher and wait until it has exited.
    ///
    /// Inserts raised before this call still get their intent; once it is
    /// called the watcher receives nothing new, and once it returns the
    /// watcher is gone.
    pub async fn cancel(mut self) {
        self.events.unsubscribe(self.subscription);

        let Some(handle) = self.handle.take() else {
            return;
        };
        match handle.await {
            Ok(emitted) => debug!(emitted, "Edit watcher cancelled"),
            Err(e) => warn!(error = %e, "Edit watcher ended abnormally"),
        }
    }

    /// Whether the watcher task has already exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for EditWatcherHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take()
            && !handle.is_finished()
        {
            debug!("Edit watcher handle dropped, aborting task");
            self.events.unsubscribe(self.subscription);
            handle.abort();
        }
    }
}

/// Fork the edit watcher.
///
/// The subscription is taken before this returns, so every `EmailInsert`
/// raised afterwards is seen. Each one yields exactly one `ValidateEmail`
/// intent until the watcher is cancelled.
pub fn spawn_edit_watcher(events: &Arc<EventBus>, sink: Arc<dyn IntentSink>) -> EditWatcherHandle {
    let mut subscription = events.subscribe();
    let id = subscription.id();

    let handle = tokio::spawn(async move {
        debug!("Edit watcher started");
        let mut emitted: u64 = 0;

        // Ends only when the owner unsubscribes and the queue is drained
        while let Some(event) = subscription.recv().await {
            if event == OnboardingEvent::EmailInsert {
                let intent = NavigationIntent::validate_email();
                debug!(%intent, "Email inserted, asking for validation");
                sink.emit(intent);
                emitted += 1;
            }
        }

        emitted
    });

    EditWatcherHandle {
        events: Arc::clone(events),
        subscription: id,
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::intent::ChannelIntentSink;

    fn setup() -> (
        Arc<EventBus>,
        Arc<dyn IntentSink>,
        tokio::sync::mpsc::UnboundedReceiver<NavigationIntent>,
    ) {
        let bus = EventBus::new();
        let (sink, rx) = ChannelIntentSink::new();
        let sink: Arc<dyn IntentSink> = Arc::new(sink);
        (bus, sink, rx)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<NavigationIntent>) -> usize {
        let mut count = 0;
        while let Ok(intent) = rx.try_recv() {
            assert_eq!(intent, NavigationIntent::validate_email());
            count += 1;
        }
        count
    }

    #[tokio::test]
    async fn each_insert_yields_one_validate_intent() {
        let (bus, sink, mut intents) = setup();
        let watcher = spawn_edit_watcher(&bus, sink);

        for _ in 0..3 {
            bus.emit(OnboardingEvent::EmailInsert);
        }
        for _ in 0..3 {
            assert_eq!(intents.recv().await, Some(NavigationIntent::validate_email()));
        }

        watcher.cancel().await;
        assert!(intents.try_recv().is_err());
    }

    #[tokio::test]
    async fn burst_of_inserts_is_not_dropped() {
        let (bus, sink, mut intents) = setup();
        let watcher = spawn_edit_watcher(&bus, sink);

        for _ in 0..500 {
            bus.emit(OnboardingEvent::EmailInsert);
        }
        watcher.cancel().await;

        assert_eq!(drain(&mut intents), 500);
    }

    #[tokio::test]
    async fn acknowledgment_is_ignored() {
        let (bus, sink, mut intents) = setup();
        let watcher = spawn_edit_watcher(&bus, sink);

        bus.emit(OnboardingEvent::EmailAcknowledged);
        bus.emit(OnboardingEvent::EmailInsert);
        assert_eq!(intents.recv().await, Some(NavigationIntent::validate_email()));

        watcher.cancel().await;
        assert!(intents.try_recv().is_err());
    }

    #[tokio::test]
    async fn nothing_emitted_after_cancel() {
        let (bus, sink, mut intents) = setup();
        let watcher = spawn_edit_watcher(&bus, sink);

        watcher.cancel().await;
        bus.emit(OnboardingEvent::EmailInsert);
        tokio::task::yield_now().await;

        assert!(intents.try_recv().is_err());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn insert_queued_before_cancel_still_yields_intent() {
        let (bus, sink, mut intents) = setup();
        let watcher = spawn_edit_watcher(&bus, sink);

        // Raised but not yet processed when cancellation is requested
        bus.emit(OnboardingEvent::EmailInsert);
        watcher.cancel().await;

        assert_eq!(drain(&mut intents), 1);
    }

    #[tokio::test]
    async fn drop_aborts_watcher() {
        let (bus, sink, mut intents) = setup();
        let watcher = spawn_edit_watcher(&bus, sink);
        assert!(!watcher.is_finished());
        drop(watcher);

        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(OnboardingEvent::EmailInsert);
        tokio::task::yield_now().await;

        assert!(intents.try_recv().is_err());
    }
}
