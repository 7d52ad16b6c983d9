//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{CoverEvent, PrivilegedEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Displayed cover and attacker set changes
    Cover,
    /// Outcomes of privileged document writes
    Privileged,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Cover(CoverEvent),
    Privileged(PrivilegedEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Cover(_) => Topic::Cover,
            Event::Privileged(_) => Topic::Privileged,
        }
    }
}

impl From<CoverEvent> for Event {
    fn from(event: CoverEvent) -> Self {
        Event::Cover(event)
    }
}

impl From<PrivilegedEvent> for Event {
    fn from(event: PrivilegedEvent) -> Self {
        Event::Privileged(event)
    }
}

/// Topic-based event bus
///
/// Every topic owns a broadcast channel created up front, so subscribers
/// only receive the events they asked for.
#[derive(Clone)]
pub struct EventBus {
    cover: broadcast::Sender<Event>,
    privileged: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cover: broadcast::channel(capacity).0,
            privileged: broadcast::channel(capacity).0,
        }
    }

    fn channel(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Cover => &self.cover,
            Topic::Privileged => &self.privileged,
        }
    }

    /// Publish an event to its corresponding topic
    ///
    /// Delivery is best-effort; events without subscribers are dropped.
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channel(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channel(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("cover_subscribers", &self.cover.receiver_count())
            .field("privileged_subscribers", &self.privileged.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cover_core::{CoverMode, TokenId};

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut cover_rx = bus.subscribe(Topic::Cover);
        let mut privileged_rx = bus.subscribe(Topic::Privileged);

        bus.publish(CoverEvent::AttackersChanged {
            mode: CoverMode::CoverTypes,
            attackers: vec![TokenId(1)],
        });

        let event = cover_rx.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Cover);
        assert!(privileged_rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(CoverEvent::AttackersChanged {
            mode: CoverMode::CoverEffects,
            attackers: Vec::new(),
        });
    }
}
