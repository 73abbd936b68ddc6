//! Turns user-targeted platform events into stored notifications.
//!
//! [`NotificationWriter`] subscribes to the [`EventBus`](crate::EventBus)
//! and runs until the bus is dropped.

use serde_json::Value;
use swing_core::events::{
    EVENT_COMPETITION_JOINED, EVENT_COMPETITION_WITHDRAWN, EVENT_PROFILE_CREATED,
    EVENT_VOTE_CAST, KIND_COMPETITION, KIND_SYSTEM, KIND_VOTE,
};
use swing_db::models::notification::{CreateNotification, Notification};
use swing_db::{DbResult, Store};
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background service that writes notifications for platform events.
pub struct NotificationWriter {
    store: Store,
}

impl NotificationWriter {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Consume events until the channel closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to write notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification writer lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification writer shutting down");
                    break;
                }
            }
        }
    }

    /// Write the notification for one event, if it produces one.
    pub async fn handle(&self, event: &PlatformEvent) -> DbResult<Option<Notification>> {
        let Some(input) = render(event) else {
            tracing::debug!(event_type = %event.event_type, "No notification for event");
            return Ok(None);
        };
        let notification = self.store.notifications.insert(&Notification::new(input)).await?;
        tracing::debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Notification written"
        );
        Ok(Some(notification))
    }
}

/// Build the notification for `event`. `None` for untargeted or unknown
/// events.
fn render(event: &PlatformEvent) -> Option<CreateNotification> {
    let user_id = event.target_user_id.clone()?;
    let competition_link = event
        .source_entity_id
        .as_ref()
        .filter(|_| event.source_entity_type.as_deref() == Some("competition"))
        .map(|id| format!("/competitions/{id}"));
    let competition_title = event
        .payload
        .get("competitionTitle")
        .and_then(Value::as_str)
        .unwrap_or("a competition");

    let (kind, title, message, link) = match event.event_type.as_str() {
        EVENT_VOTE_CAST => {
            let votes = event.payload.get("votes").and_then(Value::as_u64).unwrap_or(1);
            let premium = event
                .payload
                .get("isPremium")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let message = match (votes, premium) {
                (1, false) => "Someone voted for you".to_string(),
                (1, true) => "Someone cast a premium vote for you".to_string(),
                (n, _) => format!("You received {n} premium votes"),
            };
            (KIND_VOTE, "New vote".to_string(), message, competition_link)
        }
        EVENT_COMPETITION_JOINED => (
            KIND_COMPETITION,
            "Registration confirmed".to_string(),
            format!("You are now registered for {competition_title}"),
            competition_link,
        ),
        EVENT_COMPETITION_WITHDRAWN => (
            KIND_COMPETITION,
            "Registration withdrawn".to_string(),
            format!("You withdrew from {competition_title}"),
            competition_link,
        ),
        EVENT_PROFILE_CREATED => (
            KIND_SYSTEM,
            "Welcome to Swing".to_string(),
            "Your profile is live. Join a competition to start collecting votes.".to_string(),
            Some("/dashboard".to_string()),
        ),
        _ => return None,
    };

    Some(CreateNotification {
        user_id,
        kind: kind.to_string(),
        title,
        message,
        link,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::bus::EventBus;

    #[tokio::test]
    async fn vote_event_notifies_model() {
        let store = Store::in_memory();
        let writer = NotificationWriter::new(store.clone());

        let event = PlatformEvent::new(EVENT_VOTE_CAST)
            .with_source("competition", "c1")
            .with_actor("v1")
            .with_target("m1")
            .with_payload(json!({ "votes": 1, "isPremium": false }));
        let written = writer.handle(&event).await.unwrap().unwrap();

        assert_eq!(written.kind, KIND_VOTE);
        assert_eq!(written.link.as_deref(), Some("/competitions/c1"));
        assert_eq!(store.notifications.unread_count("m1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn premium_package_message_counts_votes() {
        let event = PlatformEvent::new(EVENT_VOTE_CAST)
            .with_target("m1")
            .with_payload(json!({ "votes": 15, "isPremium": true }));
        let rendered = render(&event).unwrap();
        assert_eq!(rendered.message, "You received 15 premium votes");
        assert!(rendered.link.is_none());
    }

    #[tokio::test]
    async fn untargeted_and_unknown_events_are_skipped() {
        let writer = NotificationWriter::new(Store::in_memory());
        assert!(writer
            .handle(&PlatformEvent::new(EVENT_VOTE_CAST))
            .await
            .unwrap()
            .is_none());
        assert!(writer
            .handle(&PlatformEvent::new("user.deleted").with_target("m1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn run_stops_when_bus_is_dropped() {
        let store = Store::in_memory();
        let bus = EventBus::default();
        let handle = tokio::spawn(NotificationWriter::new(store.clone()).run(bus.subscribe()));

        bus.publish(
            PlatformEvent::new(EVENT_COMPETITION_JOINED)
                .with_source("competition", "c1")
                .with_target("m1")
                .with_payload(json!({ "competitionTitle": "Spring Showcase" })),
        );
        drop(bus);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        let list = store.notifications.list_for_user("m1", false, 10, 0).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].message, "You are now registered for Spring Showcase");
    }
}
