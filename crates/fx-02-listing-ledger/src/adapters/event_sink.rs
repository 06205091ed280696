//! # Notification Sinks

use crate::events::MarketEvent;
use crate::ports::outbound::EventSink;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::trace;

/// Keeps every published notification in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<MarketEvent>>,
}

impl InMemoryEventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<MarketEvent> {
        self.events.lock().clone()
    }

    /// Number of published notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Removes and returns everything published so far.
    pub fn take(&self) -> Vec<MarketEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for InMemoryEventLog {
    fn publish(&self, event: MarketEvent) {
        self.events.lock().push(event);
    }
}

/// Fans notifications out to any number of subscribers.
///
/// Publishing never blocks. With no subscribers the notification is dropped;
/// slow subscribers observe `RecvError::Lagged`.
#[derive(Debug)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<MarketEvent>,
}

impl BroadcastEventSink {
    /// Create a sink buffering up to `capacity` notifications per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to notifications published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventSink for BroadcastEventSink {
    fn publish(&self, event: MarketEvent) {
        let topic = event.topic();
        if self.sender.send(event).is_err() {
            trace!(topic, "No subscribers for notification");
        }
    }
}
