//! Locally cached competitions.

use swing_core::types::Timestamp;
use tokio::sync::broadcast;

use super::{emit, CacheEvent};
use crate::error::ClientResult;
use crate::models::Competition;
use crate::store::{LocalStore, KEY_COMPETITIONS};

/// The competition list last fetched from the API, kept under
/// `competitions`.
pub struct CompetitionCache {
    store: LocalStore,
    events: broadcast::Sender<CacheEvent>,
}

impl CompetitionCache {
    pub(crate) fn new(store: LocalStore, events: broadcast::Sender<CacheEvent>) -> Self {
        Self { store, events }
    }

    pub async fn replace_all(&self, competitions: &[Competition]) -> ClientResult<()> {
        self.store.set_json(KEY_COMPETITIONS, &competitions).await?;
        emit(&self.events, CacheEvent::CompetitionsChanged);
        Ok(())
    }

    pub async fn list(&self) -> ClientResult<Vec<Competition>> {
        Ok(self
            .store
            .get_json(KEY_COMPETITIONS)
            .await?
            .unwrap_or_default())
    }

    pub async fn get(&self, id: &str) -> ClientResult<Option<Competition>> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Active competitions whose end date is after `now`.
    pub async fn list_available(&self, now: Timestamp) -> ClientResult<Vec<Competition>> {
        let mut all = self.list().await?;
        all.retain(|c| c.is_available(now));
        Ok(all)
    }
}
