//! Remembers each voter's last free vote per model so the 24 hour
//! cooldown survives restarts.

use std::collections::BTreeMap;

use swing_core::types::Timestamp;
use swing_core::voting::{free_vote_eligibility, VoteEligibility};

use crate::error::ClientResult;
use crate::store::{LocalStore, KEY_LAST_VOTES};

/// voterId -> modelId -> last free vote time.
type LastVotes = BTreeMap<String, BTreeMap<String, Timestamp>>;

pub struct VoteTracker {
    store: LocalStore,
}

impl VoteTracker {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn last_vote_at(&self, voter_id: &str, model_id: &str) -> ClientResult<Option<Timestamp>> {
        let votes: LastVotes = self.store.get_json(KEY_LAST_VOTES).await?.unwrap_or_default();
        Ok(votes
            .get(voter_id)
            .and_then(|models| models.get(model_id))
            .copied())
    }

    pub async fn eligibility(
        &self,
        voter_id: &str,
        model_id: &str,
        now: Timestamp,
    ) -> ClientResult<VoteEligibility> {
        let last = self.last_vote_at(voter_id, model_id).await?;
        Ok(free_vote_eligibility(last, now))
    }

    pub async fn can_vote(&self, voter_id: &str, model_id: &str, now: Timestamp) -> ClientResult<bool> {
        Ok(self.eligibility(voter_id, model_id, now).await?.can_vote)
    }

    /// Whole hours until the next free vote; zero when voting is allowed.
    pub async fn hours_remaining(
        &self,
        voter_id: &str,
        model_id: &str,
        now: Timestamp,
    ) -> ClientResult<i64> {
        Ok(self.eligibility(voter_id, model_id, now).await?.hours_remaining)
    }

    /// Record a free vote cast at `at`.
    pub async fn record_vote(&self, voter_id: &str, model_id: &str, at: Timestamp) -> ClientResult<()> {
        self.store
            .update_json(KEY_LAST_VOTES, |votes: &mut LastVotes| {
                votes
                    .entry(voter_id.to_string())
                    .or_default()
                    .insert(model_id.to_string(), at);
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn cooldown_follows_recorded_votes() {
        let tracker = VoteTracker::new(LocalStore::in_memory());
        let now = Utc::now();
        assert!(tracker.can_vote("v1", "m1", now).await.unwrap());

        tracker
            .record_vote("v1", "m1", now - Duration::hours(23))
            .await
            .unwrap();
        assert!(!tracker.can_vote("v1", "m1", now).await.unwrap());
        assert_eq!(tracker.hours_remaining("v1", "m1", now).await.unwrap(), 1);

        // Other pairs are independent.
        assert!(tracker.can_vote("v1", "m2", now).await.unwrap());
        assert!(tracker.can_vote("v2", "m1", now).await.unwrap());

        tracker
            .record_vote("v1", "m1", now - Duration::hours(25))
            .await
            .unwrap();
        assert!(tracker.can_vote("v1", "m1", now).await.unwrap());
    }

    #[tokio::test]
    async fn ids_containing_colons_do_not_collide() {
        let tracker = VoteTracker::new(LocalStore::in_memory());
        let now = Utc::now();

        tracker.record_vote("a:b", "c", now).await.unwrap();
        assert!(!tracker.can_vote("a:b", "c", now).await.unwrap());
        assert!(tracker.can_vote("a", "b:c", now).await.unwrap());
        assert!(tracker.last_vote_at("a", "b:c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn survives_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let voted_at = Utc::now() - Duration::hours(2);

        let tracker = VoteTracker::new(LocalStore::open(&path).await.unwrap());
        tracker.record_vote("v1", "m1", voted_at).await.unwrap();
        drop(tracker);

        let tracker = VoteTracker::new(LocalStore::open(&path).await.unwrap());
        assert_eq!(
            tracker.last_vote_at("v1", "m1").await.unwrap(),
            Some(voted_at)
        );
        assert!(!tracker.can_vote("v1", "m1", Utc::now()).await.unwrap());
    }
}
