//! Competition standings: vote re-tally and ranking of active
//! registrations.

use std::collections::HashMap;

use serde::Serialize;
use swing_core::types::{EntityId, Timestamp};
use swing_core::voting::competition_ranks;
use swing_db::models::registration::{Registration, RegistrationFilter};
use swing_db::{DbResult, Store};

/// One row of a competition leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub ranking: i32,
    pub registration_id: EntityId,
    pub model_id: EntityId,
    pub display_name: Option<String>,
    pub image: Option<String>,
    pub votes: i64,
    pub registered_at: Timestamp,
}

/// Recount votes for every active registration in `competition_id` and
/// store the resulting tallies and rankings.
///
/// Returns the active registrations ordered by ranking, then by
/// registration time.
pub async fn retally(store: &Store, competition_id: &str) -> DbResult<Vec<Registration>> {
    let registrations = store
        .registrations
        .list(&RegistrationFilter::active_in(competition_id))
        .await?;
    let tally: HashMap<String, i64> = store
        .votes
        .tally(competition_id)
        .await?
        .into_iter()
        .map(|t| (t.model_id, t.votes))
        .collect();

    let votes: Vec<i64> = registrations
        .iter()
        .map(|r| tally.get(&r.model_id).copied().unwrap_or(0))
        .collect();
    let ranks = competition_ranks(&votes);

    let mut standings = Vec::with_capacity(registrations.len());
    for ((registration, votes), ranking) in registrations.into_iter().zip(votes).zip(ranks) {
        if registration.votes == votes && registration.ranking == ranking {
            standings.push(registration);
            continue;
        }
        let updated = store
            .registrations
            .update_stats(&registration.id, votes, ranking)
            .await?;
        standings.push(updated.unwrap_or(registration));
    }

    sort_standings(&mut standings);
    tracing::debug!(
        competition_id,
        participants = standings.len(),
        "Competition re-tallied"
    );
    Ok(standings)
}

/// Active registrations of `competition_id` in leaderboard order, with the
/// model's display details.
pub async fn leaderboard(store: &Store, competition_id: &str) -> DbResult<Vec<LeaderboardEntry>> {
    let mut registrations = store
        .registrations
        .list(&RegistrationFilter::active_in(competition_id))
        .await?;
    sort_standings(&mut registrations);

    let mut entries = Vec::with_capacity(registrations.len());
    for registration in registrations {
        let user = store.users.find_by_id(&registration.model_id).await?;
        let display_name = user.as_ref().map(|u| {
            u.profile()
                .map(|p| p.display_name.clone())
                .unwrap_or_else(|| u.name.clone())
        });
        entries.push(LeaderboardEntry {
            ranking: registration.ranking,
            registration_id: registration.id,
            model_id: registration.model_id,
            display_name,
            image: user.and_then(|u| u.image),
            votes: registration.votes,
            registered_at: registration.registered_at,
        });
    }
    Ok(entries)
}

/// Ranked rows first (ascending), unranked (`0`) last; ties by earlier
/// registration.
fn sort_standings(registrations: &mut [Registration]) {
    registrations.sort_by(|a, b| {
        let rank = |r: &Registration| if r.ranking > 0 { r.ranking } else { i32::MAX };
        rank(a)
            .cmp(&rank(b))
            .then_with(|| a.registered_at.cmp(&b.registered_at))
    });
}

#[cfg(test)]
mod tests {
    use swing_db::models::vote::{CreateVote, Vote};

    use super::*;

    async fn cast(store: &Store, model: &str, voter: &str) {
        store
            .votes
            .insert(&Vote::new(CreateVote {
                model_id: model.to_string(),
                competition_id: Some("c1".to_string()),
                voter_id: voter.to_string(),
                is_premium: false,
                package_id: None,
            }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn retally_ranks_with_shared_places() {
        let store = Store::in_memory();
        for model in ["m1", "m2", "m3"] {
            store.registrations.register("c1", model).await.unwrap();
        }
        cast(&store, "m2", "v1").await;
        cast(&store, "m2", "v2").await;
        cast(&store, "m3", "v1").await;
        cast(&store, "m3", "v2").await;
        cast(&store, "m1", "v1").await;

        let standings = retally(&store, "c1").await.unwrap();
        let summary: Vec<(&str, i64, i32)> = standings
            .iter()
            .map(|r| (r.model_id.as_str(), r.votes, r.ranking))
            .collect();
        assert_eq!(
            summary,
            vec![("m2", 2, 1), ("m3", 2, 1), ("m1", 1, 3)]
        );
    }

    #[tokio::test]
    async fn withdrawn_models_drop_out_of_the_tally() {
        let store = Store::in_memory();
        let withdrawn = store.registrations.register("c1", "m1").await.unwrap();
        store.registrations.register("c1", "m2").await.unwrap();
        cast(&store, "m1", "v1").await;
        store.registrations.withdraw(&withdrawn.id).await.unwrap();

        let standings = retally(&store, "c1").await.unwrap();
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].model_id, "m2");
        assert_eq!(standings[0].ranking, 1);
    }
}
