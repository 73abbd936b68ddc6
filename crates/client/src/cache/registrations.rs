//! Locally cached competition registrations.

use chrono::Utc;
use swing_core::registration::RegistrationStatus;
use swing_core::types::new_id;
use tokio::sync::broadcast;

use super::{emit, CacheEvent};
use crate::error::{ClientError, ClientResult};
use crate::models::Registration;
use crate::store::{LocalStore, KEY_REGISTRATIONS};

/// Registrations for every model and competition, kept under
/// `modelRegistrations`. Records are never removed; withdrawing flips the
/// status.
pub struct RegistrationStore {
    store: LocalStore,
    events: broadcast::Sender<CacheEvent>,
}

fn is_active_pair(r: &Registration, model_id: &str, competition_id: &str) -> bool {
    r.is_active() && r.model_id == model_id && r.competition_id == competition_id
}

impl RegistrationStore {
    pub(crate) fn new(store: LocalStore, events: broadcast::Sender<CacheEvent>) -> Self {
        Self { store, events }
    }

    async fn all(&self) -> ClientResult<Vec<Registration>> {
        Ok(self
            .store
            .get_json(KEY_REGISTRATIONS)
            .await?
            .unwrap_or_default())
    }

    /// Append an active registration for the pair.
    ///
    /// Fails with [`ClientError::Duplicate`] when the model already holds an
    /// active registration in the competition.
    pub async fn register(&self, model_id: &str, competition_id: &str) -> ClientResult<Registration> {
        let registration = self
            .store
            .update_json(KEY_REGISTRATIONS, |all: &mut Vec<Registration>| {
                if all.iter().any(|r| is_active_pair(r, model_id, competition_id)) {
                    return Err(ClientError::Duplicate(format!(
                        "Model {model_id} is already registered for competition {competition_id}"
                    )));
                }
                let registration = Registration {
                    id: new_id(),
                    competition_id: competition_id.to_string(),
                    model_id: model_id.to_string(),
                    status: RegistrationStatus::Active,
                    votes: 0,
                    ranking: 0,
                    registered_at: Utc::now(),
                };
                all.push(registration.clone());
                Ok(registration)
            })
            .await?;

        self.changed(competition_id);
        Ok(registration)
    }

    /// Mark the pair's active registration withdrawn.
    pub async fn withdraw(&self, model_id: &str, competition_id: &str) -> ClientResult<Registration> {
        let registration = self
            .store
            .update_json(KEY_REGISTRATIONS, |all: &mut Vec<Registration>| {
                let record = all
                    .iter_mut()
                    .find(|r| is_active_pair(r, model_id, competition_id))
                    .ok_or_else(|| not_registered(model_id, competition_id))?;
                record.status = RegistrationStatus::Withdrawn;
                Ok(record.clone())
            })
            .await?;

        self.changed(competition_id);
        Ok(registration)
    }

    /// Overwrite the vote tally and ranking of the pair's active
    /// registration.
    pub async fn update_model_stats(
        &self,
        model_id: &str,
        competition_id: &str,
        votes: i64,
        ranking: i32,
    ) -> ClientResult<Registration> {
        let registration = self
            .store
            .update_json(KEY_REGISTRATIONS, |all: &mut Vec<Registration>| {
                let record = all
                    .iter_mut()
                    .find(|r| is_active_pair(r, model_id, competition_id))
                    .ok_or_else(|| not_registered(model_id, competition_id))?;
                record.votes = votes;
                record.ranking = ranking;
                Ok(record.clone())
            })
            .await?;

        self.changed(competition_id);
        Ok(registration)
    }

    /// Replace a model's cached registrations with the server's view.
    pub async fn sync_for_model(&self, model_id: &str, fresh: Vec<Registration>) -> ClientResult<()> {
        let competitions: Vec<String> = fresh.iter().map(|r| r.competition_id.clone()).collect();
        self.store
            .update_json(KEY_REGISTRATIONS, |all: &mut Vec<Registration>| {
                all.retain(|r| r.model_id != model_id);
                all.extend(fresh);
                Ok(())
            })
            .await?;

        for competition_id in competitions {
            self.changed(&competition_id);
        }
        Ok(())
    }

    pub async fn list_by_competition(&self, competition_id: &str) -> ClientResult<Vec<Registration>> {
        let mut all = self.all().await?;
        all.retain(|r| r.competition_id == competition_id);
        Ok(all)
    }

    pub async fn list_by_model(&self, model_id: &str) -> ClientResult<Vec<Registration>> {
        let mut all = self.all().await?;
        all.retain(|r| r.model_id == model_id);
        Ok(all)
    }

    pub async fn find_active(
        &self,
        model_id: &str,
        competition_id: &str,
    ) -> ClientResult<Option<Registration>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|r| is_active_pair(r, model_id, competition_id)))
    }

    fn changed(&self, competition_id: &str) {
        emit(
            &self.events,
            CacheEvent::RegistrationsChanged {
                competition_id: competition_id.to_string(),
            },
        );
    }
}

fn not_registered(model_id: &str, competition_id: &str) -> ClientError {
    ClientError::NotFound(format!(
        "No active registration for model {model_id} in competition {competition_id}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ClientCache;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn second_register_is_a_duplicate() {
        let cache = ClientCache::new(LocalStore::in_memory());
        let store = &cache.registrations;

        store.register("m1", "c1").await.unwrap();
        assert_matches!(
            store.register("m1", "c1").await,
            Err(ClientError::Duplicate(_))
        );

        let active: Vec<_> = store
            .list_by_competition("c1")
            .await
            .unwrap()
            .into_iter()
            .filter(Registration::is_active)
            .collect();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn withdraw_keeps_the_record() {
        let cache = ClientCache::new(LocalStore::in_memory());
        let store = &cache.registrations;

        store.register("m1", "c1").await.unwrap();
        let withdrawn = store.withdraw("m1", "c1").await.unwrap();
        assert_eq!(withdrawn.status, RegistrationStatus::Withdrawn);
        assert_matches!(store.withdraw("m1", "c1").await, Err(ClientError::NotFound(_)));

        // Rejoining is allowed once withdrawn.
        store.register("m1", "c1").await.unwrap();
        assert_eq!(store.list_by_model("m1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stats_update_targets_active_record() {
        let cache = ClientCache::new(LocalStore::in_memory());
        let store = &cache.registrations;
        store.register("m1", "c1").await.unwrap();
        store.register("m2", "c1").await.unwrap();

        let updated = store.update_model_stats("m2", "c1", 12, 1).await.unwrap();
        assert_eq!((updated.votes, updated.ranking), (12, 1));

        let m1 = store.find_active("m1", "c1").await.unwrap().unwrap();
        assert_eq!((m1.votes, m1.ranking), (0, 0));

        assert_matches!(
            store.update_model_stats("m9", "c1", 1, 1).await,
            Err(ClientError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn mutations_send_invalidations() {
        let cache = ClientCache::new(LocalStore::in_memory());
        let mut rx = cache.subscribe();

        cache.registrations.register("m1", "c7").await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            CacheEvent::RegistrationsChanged {
                competition_id: "c7".to_string()
            }
        );

        // A rejected register sends nothing.
        let _ = cache.registrations.register("m1", "c7").await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn sync_replaces_only_that_model() {
        let cache = ClientCache::new(LocalStore::in_memory());
        let store = &cache.registrations;
        store.register("m1", "c1").await.unwrap();
        store.register("m2", "c1").await.unwrap();

        let mut fresh = store.list_by_model("m1").await.unwrap();
        fresh[0].votes = 40;
        store.sync_for_model("m1", fresh).await.unwrap();

        assert_eq!(store.find_active("m1", "c1").await.unwrap().unwrap().votes, 40);
        assert!(store.find_active("m2", "c1").await.unwrap().is_some());
    }
}
