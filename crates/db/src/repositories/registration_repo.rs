//! Repository for the `registrations` table.
//!
//! Registrations are soft-withdrawn. Rows are only removed together with
//! their competition.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use swing_core::registration::RegistrationStatus;
use tokio::sync::RwLock;

use crate::error::{map_unique_violation, DbError, DbResult};
use crate::models::registration::{Registration, RegistrationFilter};

/// Column list for `registrations` queries.
const COLUMNS: &str = "id, competition_id, model_id, status, votes, ranking, \
     registered_at, withdrawn_at, updated_at";

const DUPLICATE_MESSAGE: &str = "Model is already registered for this competition";

/// Storage operations for competition registrations.
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Registration>>;
    /// The active registration for a model in a competition, if any.
    async fn find_active(
        &self,
        competition_id: &str,
        model_id: &str,
    ) -> DbResult<Option<Registration>>;
    /// List registrations matching `filter` in registration order.
    async fn list(&self, filter: &RegistrationFilter) -> DbResult<Vec<Registration>>;
    /// Create an active registration.
    ///
    /// Fails with [`DbError::Conflict`] when the pair already has an active
    /// registration. The check and the insert are atomic.
    async fn register(&self, competition_id: &str, model_id: &str) -> DbResult<Registration>;
    /// Mark a registration withdrawn.
    async fn withdraw(&self, id: &str) -> DbResult<Option<Registration>>;
    /// Overwrite the vote tally and ranking.
    async fn update_stats(
        &self,
        id: &str,
        votes: i64,
        ranking: i32,
    ) -> DbResult<Option<Registration>>;
    /// Remove every registration of a deleted competition.
    async fn delete_by_competition(&self, competition_id: &str) -> DbResult<u64>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local registration storage.
#[derive(Default)]
pub struct MemRegistrationRepo {
    rows: RwLock<HashMap<String, Registration>>,
}

#[async_trait]
impl RegistrationRepository for MemRegistrationRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Registration>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_active(
        &self,
        competition_id: &str,
        model_id: &str,
    ) -> DbResult<Option<Registration>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.competition_id == competition_id && r.model_id == model_id && r.is_active())
            .cloned())
    }

    async fn list(&self, filter: &RegistrationFilter) -> DbResult<Vec<Registration>> {
        let rows = self.rows.read().await;
        let mut registrations: Vec<Registration> =
            rows.values().filter(|r| filter.matches(r)).cloned().collect();
        registrations.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(registrations)
    }

    async fn register(&self, competition_id: &str, model_id: &str) -> DbResult<Registration> {
        // Held across check and insert.
        let mut rows = self.rows.write().await;
        let duplicate = rows.values().any(|r| {
            r.competition_id == competition_id && r.model_id == model_id && r.is_active()
        });
        if duplicate {
            return Err(DbError::Conflict(DUPLICATE_MESSAGE.to_string()));
        }
        let registration = Registration::new(competition_id, model_id);
        rows.insert(registration.id.clone(), registration.clone());
        Ok(registration)
    }

    async fn withdraw(&self, id: &str) -> DbResult<Option<Registration>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(id).map(|r| {
            if r.is_active() {
                let now = chrono::Utc::now();
                r.status = RegistrationStatus::Withdrawn.as_str().to_string();
                r.withdrawn_at = Some(now);
                r.updated_at = now;
            }
            r.clone()
        }))
    }

    async fn update_stats(
        &self,
        id: &str,
        votes: i64,
        ranking: i32,
    ) -> DbResult<Option<Registration>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(id).map(|r| {
            r.votes = votes;
            r.ranking = ranking;
            r.updated_at = chrono::Utc::now();
            r.clone()
        }))
    }

    async fn delete_by_competition(&self, competition_id: &str) -> DbResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, r| r.competition_id != competition_id);
        Ok((before - rows.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// PostgreSQL-backed registration storage.
///
/// Duplicate active registrations are rejected by the partial unique index
/// `uq_registrations_active_pair`.
pub struct PgRegistrationRepo {
    pool: PgPool,
}

impl PgRegistrationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Registration>> {
        let query = format!("SELECT {COLUMNS} FROM registrations WHERE id = $1");
        Ok(sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_active(
        &self,
        competition_id: &str,
        model_id: &str,
    ) -> DbResult<Option<Registration>> {
        let query = format!(
            "SELECT {COLUMNS} FROM registrations \
             WHERE competition_id = $1 AND model_id = $2 AND status = 'active'"
        );
        Ok(sqlx::query_as::<_, Registration>(&query)
            .bind(competition_id)
            .bind(model_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, filter: &RegistrationFilter) -> DbResult<Vec<Registration>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM registrations WHERE TRUE"));
        if let Some(competition_id) = &filter.competition_id {
            builder
                .push(" AND competition_id = ")
                .push_bind(competition_id.clone());
        }
        if let Some(model_id) = &filter.model_id {
            builder.push(" AND model_id = ").push_bind(model_id.clone());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        builder.push(" ORDER BY registered_at, id");

        Ok(builder
            .build_query_as::<Registration>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn register(&self, competition_id: &str, model_id: &str) -> DbResult<Registration> {
        let registration = Registration::new(competition_id, model_id);
        let query = format!(
            "INSERT INTO registrations \
             (id, competition_id, model_id, status, votes, ranking, registered_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(&registration.id)
            .bind(&registration.competition_id)
            .bind(&registration.model_id)
            .bind(&registration.status)
            .bind(registration.votes)
            .bind(registration.ranking)
            .bind(registration.registered_at)
            .bind(registration.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_MESSAGE))
    }

    async fn withdraw(&self, id: &str) -> DbResult<Option<Registration>> {
        let query = format!(
            "UPDATE registrations SET \
                withdrawn_at = CASE WHEN status = 'active' THEN NOW() ELSE withdrawn_at END, \
                status = 'withdrawn', \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_stats(
        &self,
        id: &str,
        votes: i64,
        ranking: i32,
    ) -> DbResult<Option<Registration>> {
        let query = format!(
            "UPDATE registrations SET votes = $2, ranking = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .bind(votes)
            .bind(ranking)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_by_competition(&self, competition_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM registrations WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
