//! Typed cache collections over the [`LocalStore`].
//!
//! Each collection owns one storage key and, besides the raw storage event,
//! sends a [`CacheEvent`] naming what went stale.

mod competitions;
mod notifications;
mod registrations;

use tokio::sync::broadcast;

pub use competitions::CompetitionCache;
pub use notifications::NotificationStore;
pub use registrations::RegistrationStore;

use crate::store::LocalStore;

const EVENT_CAPACITY: usize = 256;

/// Invalidation message sent after a collection changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    CompetitionsChanged,
    RegistrationsChanged { competition_id: String },
    NotificationsChanged,
}

/// The three collections sharing one store and one event channel.
pub struct ClientCache {
    pub competitions: CompetitionCache,
    pub registrations: RegistrationStore,
    pub notifications: NotificationStore,
    events: broadcast::Sender<CacheEvent>,
}

impl ClientCache {
    pub fn new(store: LocalStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            competitions: CompetitionCache::new(store.clone(), events.clone()),
            registrations: RegistrationStore::new(store.clone(), events.clone()),
            notifications: NotificationStore::new(store, events.clone()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }
}

/// Send an invalidation; having no subscribers is not an error.
fn emit(events: &broadcast::Sender<CacheEvent>, event: CacheEvent) {
    let _ = events.send(event);
}
