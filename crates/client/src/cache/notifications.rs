//! Locally cached notifications, newest first.

use tokio::sync::broadcast;

use super::{emit, CacheEvent};
use crate::error::ClientResult;
use crate::models::Notification;
use crate::store::{LocalStore, KEY_NOTIFICATIONS};

pub struct NotificationStore {
    store: LocalStore,
    events: broadcast::Sender<CacheEvent>,
}

impl NotificationStore {
    pub(crate) fn new(store: LocalStore, events: broadcast::Sender<CacheEvent>) -> Self {
        Self { store, events }
    }

    /// Add a notification at the front. A notification whose id is already
    /// cached replaces the old copy.
    pub async fn add(&self, notification: Notification) -> ClientResult<()> {
        self.store
            .update_json(KEY_NOTIFICATIONS, |all: &mut Vec<Notification>| {
                all.retain(|n| n.id != notification.id);
                all.insert(0, notification);
                Ok(())
            })
            .await?;
        emit(&self.events, CacheEvent::NotificationsChanged);
        Ok(())
    }

    pub async fn replace_all(&self, notifications: &[Notification]) -> ClientResult<()> {
        self.store.set_json(KEY_NOTIFICATIONS, &notifications).await?;
        emit(&self.events, CacheEvent::NotificationsChanged);
        Ok(())
    }

    pub async fn list(&self) -> ClientResult<Vec<Notification>> {
        Ok(self
            .store
            .get_json(KEY_NOTIFICATIONS)
            .await?
            .unwrap_or_default())
    }

    /// Returns whether an unread notification with `id` was found.
    pub async fn mark_read(&self, id: &str) -> ClientResult<bool> {
        let found = self
            .store
            .update_json(KEY_NOTIFICATIONS, |all: &mut Vec<Notification>| {
                Ok(match all.iter_mut().find(|n| n.id == id && !n.is_read) {
                    Some(n) => {
                        n.is_read = true;
                        true
                    }
                    None => false,
                })
            })
            .await?;
        if found {
            emit(&self.events, CacheEvent::NotificationsChanged);
        }
        Ok(found)
    }

    /// Returns how many notifications changed.
    pub async fn mark_all_read(&self) -> ClientResult<usize> {
        let marked = self
            .store
            .update_json(KEY_NOTIFICATIONS, |all: &mut Vec<Notification>| {
                let mut marked = 0;
                for n in all.iter_mut().filter(|n| !n.is_read) {
                    n.is_read = true;
                    marked += 1;
                }
                Ok(marked)
            })
            .await?;
        if marked > 0 {
            emit(&self.events, CacheEvent::NotificationsChanged);
        }
        Ok(marked)
    }

    pub async fn unread_count(&self) -> ClientResult<usize> {
        Ok(self.list().await?.iter().filter(|n| !n.is_read).count())
    }
}
