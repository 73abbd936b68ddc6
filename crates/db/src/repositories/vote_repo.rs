//! Repository for the `votes` table.
//!
//! Votes are append-only: there is no update or delete.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use swing_core::types::Timestamp;
use tokio::sync::RwLock;

use crate::error::{map_unique_violation, DbResult};
use crate::models::vote::{Vote, VoteFilter, VoteTally};

/// Column list for `votes` queries.
const COLUMNS: &str = "id, model_id, competition_id, voter_id, is_premium, package_id, created_at";

/// Storage operations for votes.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn insert(&self, vote: &Vote) -> DbResult<Vote>;
    /// Votes matching `filter`, newest first.
    async fn list(&self, filter: &VoteFilter) -> DbResult<Vec<Vote>>;
    async fn count(&self, filter: &VoteFilter) -> DbResult<i64>;
    /// When `voter_id` last cast a free (`premium = false`) or premium vote
    /// for `model_id`.
    async fn last_vote_at(
        &self,
        voter_id: &str,
        model_id: &str,
        premium: bool,
    ) -> DbResult<Option<Timestamp>>;
    /// Vote counts per model within a competition, highest first.
    async fn tally(&self, competition_id: &str) -> DbResult<Vec<VoteTally>>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local vote storage.
#[derive(Default)]
pub struct MemVoteRepo {
    rows: RwLock<Vec<Vote>>,
}

#[async_trait]
impl VoteRepository for MemVoteRepo {
    async fn insert(&self, vote: &Vote) -> DbResult<Vote> {
        self.rows.write().await.push(vote.clone());
        Ok(vote.clone())
    }

    async fn list(&self, filter: &VoteFilter) -> DbResult<Vec<Vote>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &VoteFilter) -> DbResult<i64> {
        let rows = self.rows.read().await;
        let n = rows.iter().filter(|v| filter.matches(v)).count();
        Ok(i64::try_from(n).unwrap_or(i64::MAX))
    }

    async fn last_vote_at(
        &self,
        voter_id: &str,
        model_id: &str,
        premium: bool,
    ) -> DbResult<Option<Timestamp>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|v| v.voter_id == voter_id && v.model_id == model_id && v.is_premium == premium)
            .map(|v| v.created_at)
            .max())
    }

    async fn tally(&self, competition_id: &str) -> DbResult<Vec<VoteTally>> {
        let rows = self.rows.read().await;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for vote in rows
            .iter()
            .filter(|v| v.competition_id.as_deref() == Some(competition_id))
        {
            *counts.entry(vote.model_id.as_str()).or_default() += 1;
        }
        let mut tally: Vec<VoteTally> = counts
            .into_iter()
            .map(|(model_id, votes)| VoteTally {
                model_id: model_id.to_string(),
                votes,
            })
            .collect();
        tally.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.model_id.cmp(&b.model_id)));
        Ok(tally)
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// PostgreSQL-backed vote storage.
pub struct PgVoteRepo {
    pool: PgPool,
}

impl PgVoteRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append `WHERE` conditions for every present filter field.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &VoteFilter) {
    builder.push(" WHERE TRUE");
    if let Some(model_id) = &filter.model_id {
        builder.push(" AND model_id = ").push_bind(model_id.clone());
    }
    if let Some(voter_id) = &filter.voter_id {
        builder.push(" AND voter_id = ").push_bind(voter_id.clone());
    }
    if let Some(competition_id) = &filter.competition_id {
        builder
            .push(" AND competition_id = ")
            .push_bind(competition_id.clone());
    }
    if let Some(premium) = filter.is_premium {
        builder.push(" AND is_premium = ").push_bind(premium);
    }
    if let Some(since) = filter.since {
        builder.push(" AND created_at >= ").push_bind(since);
    }
}

#[async_trait]
impl VoteRepository for PgVoteRepo {
    async fn insert(&self, vote: &Vote) -> DbResult<Vote> {
        let query = format!(
            "INSERT INTO votes \
             (id, model_id, competition_id, voter_id, is_premium, package_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(&vote.id)
            .bind(&vote.model_id)
            .bind(&vote.competition_id)
            .bind(&vote.voter_id)
            .bind(vote.is_premium)
            .bind(&vote.package_id)
            .bind(vote.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Vote already exists"))
    }

    async fn list(&self, filter: &VoteFilter) -> DbResult<Vec<Vote>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM votes"));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC, id DESC");
        Ok(builder
            .build_query_as::<Vote>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count(&self, filter: &VoteFilter) -> DbResult<i64> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM votes");
        push_filter(&mut builder, filter);
        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn last_vote_at(
        &self,
        voter_id: &str,
        model_id: &str,
        premium: bool,
    ) -> DbResult<Option<Timestamp>> {
        let last: Option<Timestamp> = sqlx::query_scalar(
            "SELECT MAX(created_at) FROM votes \
             WHERE voter_id = $1 AND model_id = $2 AND is_premium = $3",
        )
        .bind(voter_id)
        .bind(model_id)
        .bind(premium)
        .fetch_one(&self.pool)
        .await?;
        Ok(last)
    }

    async fn tally(&self, competition_id: &str) -> DbResult<Vec<VoteTally>> {
        Ok(sqlx::query_as::<_, VoteTally>(
            "SELECT model_id, COUNT(*) AS votes FROM votes \
             WHERE competition_id = $1 \
             GROUP BY model_id \
             ORDER BY votes DESC, model_id",
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
