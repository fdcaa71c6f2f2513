//! Onboarding event bus — fan-out of UI events to the coordinator and its watcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, mpsc};
use tracing::debug;

/// Unit events raised by the UI layer during the email step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingEvent {
    /// The user pressed "Continue" after reviewing their email.
    EmailAcknowledged,
    /// The user submitted a new or edited email address.
    EmailInsert,
}

impl std::fmt::Display for OnboardingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmailAcknowledged => "email_acknowledged",
            Self::EmailInsert => "email_insert",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OnboardingEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email_acknowledged" | "ack" => Ok(Self::EmailAcknowledged),
            "email_insert" | "insert" => Ok(Self::EmailInsert),
            other => Err(format!("unknown onboarding event: {other}")),
        }
    }
}

/// Identifies one subscription on an [`EventBus`].
pub type SubscriptionId = u64;

/// Receiving end of a bus subscription. Every event raised while the
/// subscription is registered is queued here, in order, without loss.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<OnboardingEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next event; `None` once unsubscribed and the queue is drained.
    pub async fn recv(&mut self) -> Option<OnboardingEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<OnboardingEvent> {
        self.rx.try_recv().ok()
    }
}

/// Fan-out bus for [`OnboardingEvent`]s.
///
/// Each subscriber gets its own unbounded queue. `EmailAcknowledged` also
/// sets a pending flag consumed by [`EventBus::acknowledged`], so an
/// acknowledgment raised before anyone waits is still observed. The flag
/// holds at most one acknowledgment; [`EventBus::clear_acknowledgment`]
/// discards a leftover one.
pub struct EventBus {
    subscribers: Mutex<HashMap<SubscriptionId, mpsc::UnboundedSender<OnboardingEvent>>>,
    next_id: AtomicU64,
    ack_pending: AtomicBool,
    ack_notify: Notify,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn subscribers(
        &self,
    ) -> MutexGuard<'_, HashMap<SubscriptionId, mpsc::UnboundedSender<OnboardingEvent>>> {
        // A panic while holding the lock cannot leave the map inconsistent
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to every event raised from now on.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers().insert(id, tx);
        Subscription { id, rx }
    }

    /// Stop delivering to `id`. Events already queued stay readable.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers().remove(&id);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers()
            .values()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Raise an event.
    pub fn emit(&self, event: OnboardingEvent) {
        {
            let mut subscribers = self.subscribers();
            // Drop subscribers whose receiver is gone
            subscribers.retain(|_, tx| tx.send(event).is_ok());
            debug!(%event, subscribers = subscribers.len(), "Onboarding event raised");
        }

        if event == OnboardingEvent::EmailAcknowledged {
            self.ack_pending.store(true, Ordering::SeqCst);
            self.ack_notify.notify_waiters();
        }
    }

    /// Wait for the next (or an already pending) `EmailAcknowledged`.
    pub async fn acknowledged(&self) {
        loop {
            let notified = self.ack_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.ack_pending.swap(false, Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }

    /// Discard a pending acknowledgment nobody consumed.
    pub fn clear_acknowledgment(&self) -> bool {
        self.ack_pending.swap(false, Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            ack_pending: AtomicBool::new(false),
            ack_notify: Notify::new(),
        }
    }
}
