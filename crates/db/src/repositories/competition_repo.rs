//! Repository for the `competitions` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;

use crate::error::{map_unique_violation, DbError, DbResult};
use crate::models::competition::{Competition, CompetitionFilter, UpdateCompetition};

/// Column list for `competitions` queries.
const COLUMNS: &str = "id, title, description, status, start_date, end_date, \
     max_participants, cover_image, created_at, updated_at";

/// Storage operations for competitions.
#[async_trait]
pub trait CompetitionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Competition>>;
    /// List competitions matching `filter`, soonest-ending first.
    async fn list(&self, filter: &CompetitionFilter) -> DbResult<Vec<Competition>>;
    async fn insert(&self, competition: &Competition) -> DbResult<Competition>;
    async fn update(&self, id: &str, input: &UpdateCompetition)
        -> DbResult<Option<Competition>>;
    async fn delete(&self, id: &str) -> DbResult<bool>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local competition storage.
#[derive(Default)]
pub struct MemCompetitionRepo {
    rows: RwLock<HashMap<String, Competition>>,
}

#[async_trait]
impl CompetitionRepository for MemCompetitionRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Competition>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn list(&self, filter: &CompetitionFilter) -> DbResult<Vec<Competition>> {
        let rows = self.rows.read().await;
        let mut competitions: Vec<Competition> =
            rows.values().filter(|c| filter.matches(c)).cloned().collect();
        competitions.sort_by(|a, b| {
            a.end_date
                .cmp(&b.end_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(competitions)
    }

    async fn insert(&self, competition: &Competition) -> DbResult<Competition> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&competition.id) {
            return Err(DbError::Conflict("Competition already exists".to_string()));
        }
        rows.insert(competition.id.clone(), competition.clone());
        Ok(competition.clone())
    }

    async fn update(
        &self,
        id: &str,
        input: &UpdateCompetition,
    ) -> DbResult<Option<Competition>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(id).map(|competition| {
            input.apply(competition);
            competition.clone()
        }))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        Ok(self.rows.write().await.remove(id).is_some())
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// PostgreSQL-backed competition storage.
pub struct PgCompetitionRepo {
    pool: PgPool,
}

impl PgCompetitionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompetitionRepository for PgCompetitionRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Competition>> {
        let query = format!("SELECT {COLUMNS} FROM competitions WHERE id = $1");
        Ok(sqlx::query_as::<_, Competition>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, filter: &CompetitionFilter) -> DbResult<Vec<Competition>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM competitions WHERE TRUE"));
        if let Some(status) = &filter.status {
            builder.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(at) = filter.available_at {
            builder
                .push(" AND status = 'active' AND end_date > ")
                .push_bind(at);
        }
        builder.push(" ORDER BY end_date, created_at");

        Ok(builder
            .build_query_as::<Competition>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, competition: &Competition) -> DbResult<Competition> {
        let query = format!(
            "INSERT INTO competitions \
             (id, title, description, status, start_date, end_date, max_participants, \
              cover_image, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Competition>(&query)
            .bind(&competition.id)
            .bind(&competition.title)
            .bind(&competition.description)
            .bind(&competition.status)
            .bind(competition.start_date)
            .bind(competition.end_date)
            .bind(competition.max_participants)
            .bind(&competition.cover_image)
            .bind(competition.created_at)
            .bind(competition.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Competition already exists"))
    }

    async fn update(
        &self,
        id: &str,
        input: &UpdateCompetition,
    ) -> DbResult<Option<Competition>> {
        let query = format!(
            "UPDATE competitions SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                status = COALESCE($4, status), \
                start_date = COALESCE($5, start_date), \
                end_date = COALESCE($6, end_date), \
                max_participants = COALESCE($7, max_participants), \
                cover_image = COALESCE($8, cover_image), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Competition>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.max_participants)
            .bind(&input.cover_image)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM competitions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
