// Event Bus - fan-out side of the change notification channel.
//
// In-memory pub/sub over tokio broadcast channels. Every connected realtime
// client holds one receiver; REST mutation handlers publish here after the
// write lands. No persistence and no replay: a client that is not connected
// at publish time re-synchronizes over REST, never from the bus.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::events::SwarmEvent;

/// Event bus for publishing and subscribing to change notifications.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<SwarmEvent>>,
}

impl EventBus {
    /// Create a new event bus. Capacity bounds how many events a slow
    /// subscriber may fall behind before it starts lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish an event to all current subscribers. Sends to nobody are
    /// normal (no clients connected) and not an error.
    pub fn publish(&self, event: SwarmEvent) {
        debug!(kind = event.kind(), "broadcasting event");
        metrics::counter!("swarmware_events_published_total").increment(1);

        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("no subscribers listening to event");
        }
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers; doubles as the connection count reported
    /// by the heartbeat endpoint.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Receiver held by one realtime connection.
pub struct EventReceiver {
    receiver: broadcast::Receiver<SwarmEvent>,
}

impl EventReceiver {
    /// Receive the next event, waiting until one is published.
    pub async fn recv(&mut self) -> Result<SwarmEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&mut self) -> Result<SwarmEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::security::AlertId;
    use crate::domain::swarm::SwarmId;

    #[tokio::test]
    async fn every_subscriber_receives_each_event_once() {
        let bus = EventBus::new(10);
        let mut receivers = vec![bus.subscribe(), bus.subscribe(), bus.subscribe()];

        let id = SwarmId::new();
        bus.publish(SwarmEvent::SwarmDeleted { id });

        for receiver in &mut receivers {
            match receiver.recv().await.unwrap() {
                SwarmEvent::SwarmDeleted { id: got } => assert_eq!(got, id),
                other => panic!("unexpected event {:?}", other.kind()),
            }
            // exactly one envelope each
            assert!(matches!(receiver.try_recv(), Err(EventBusError::Empty)));
        }
    }

    #[tokio::test]
    async fn closed_subscriber_receives_nothing() {
        let bus = EventBus::new(10);
        let mut live = bus.subscribe();
        let closed = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(closed);
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(SwarmEvent::AlertResolved { id: AlertId::new() });
        assert!(live.recv().await.is_ok());
    }

    #[tokio::test]
    async fn per_subscriber_ordering_is_preserved() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe();

        let first = SwarmId::new();
        let second = SwarmId::new();
        bus.publish(SwarmEvent::SwarmDeleted { id: first });
        bus.publish(SwarmEvent::SwarmDeleted { id: second });

        match receiver.recv().await.unwrap() {
            SwarmEvent::SwarmDeleted { id } => assert_eq!(id, first),
            other => panic!("unexpected event {:?}", other.kind()),
        }
        match receiver.recv().await.unwrap() {
            SwarmEvent::SwarmDeleted { id } => assert_eq!(id, second),
            other => panic!("unexpected event {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new(10);
        bus.publish(SwarmEvent::SwarmDeleted { id: SwarmId::new() });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
