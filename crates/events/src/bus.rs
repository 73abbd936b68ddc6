//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Shared as `Arc<EventBus>` through the application state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swing_core::types::EntityId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event, e.g. a vote cast for a model.
///
/// Built with [`PlatformEvent::new`] plus the `with_*` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"vote.cast"`.
    pub event_type: String,

    /// Kind of the entity the event is about (`"competition"`, `"user"`).
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<EntityId>,

    /// Who triggered the event. For anonymous voters this is the voter id.
    pub actor_id: Option<String>,

    /// User who should be notified, if anyone.
    pub target_user_id: Option<EntityId>,

    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_id: None,
            target_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<EntityId>,
    ) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id.into());
        self
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_target(mut self, user_id: impl Into<EntityId>) -> Self {
        self.target_user_id = Some(user_id.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Every subscriber receives every event published after it subscribed.
/// Slow subscribers lose the oldest events and observe
/// `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped when there are none.
    pub fn publish(&self, event: PlatformEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_event_fields() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new("vote.cast")
                .with_source("competition", "c1")
                .with_actor("v1")
                .with_target("m1")
                .with_payload(serde_json::json!({ "votes": 3 })),
        );

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, "vote.cast");
        assert_eq!(received.source_entity_id.as_deref(), Some("c1"));
        assert_eq!(received.actor_id.as_deref(), Some("v1"));
        assert_eq!(received.target_user_id.as_deref(), Some("m1"));
        assert_eq!(received.payload["votes"], 3);
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::new("profile.created"));

        assert_eq!(rx1.recv().await.unwrap().event_type, "profile.created");
        assert_eq!(rx2.recv().await.unwrap().event_type, "profile.created");
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        EventBus::default().publish(PlatformEvent::new("orphan"));
    }
}
