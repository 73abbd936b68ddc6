//! Repository for the `prizes` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::{map_unique_violation, DbError, DbResult};
use crate::models::prize::{Prize, UpdatePrize};

/// Column list for `prizes` queries.
const COLUMNS: &str =
    "id, competition_id, title, description, placement, value, created_at, updated_at";

/// Storage operations for competition prizes.
#[async_trait]
pub trait PrizeRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Prize>>;
    /// List prizes, optionally for one competition, by competition then
    /// placement.
    async fn list(&self, competition_id: Option<&str>) -> DbResult<Vec<Prize>>;
    async fn insert(&self, prize: &Prize) -> DbResult<Prize>;
    async fn update(&self, id: &str, input: &UpdatePrize) -> DbResult<Option<Prize>>;
    async fn delete(&self, id: &str) -> DbResult<bool>;
    /// Remove every prize of a competition, returning how many went.
    async fn delete_by_competition(&self, competition_id: &str) -> DbResult<u64>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local prize storage.
#[derive(Default)]
pub struct MemPrizeRepo {
    rows: RwLock<HashMap<String, Prize>>,
}

#[async_trait]
impl PrizeRepository for MemPrizeRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Prize>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn list(&self, competition_id: Option<&str>) -> DbResult<Vec<Prize>> {
        let rows = self.rows.read().await;
        let mut prizes: Vec<Prize> = rows
            .values()
            .filter(|p| competition_id.map_or(true, |c| p.competition_id == c))
            .cloned()
            .collect();
        prizes.sort_by(|a, b| {
            a.competition_id
                .cmp(&b.competition_id)
                .then_with(|| a.placement.cmp(&b.placement))
        });
        Ok(prizes)
    }

    async fn insert(&self, prize: &Prize) -> DbResult<Prize> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&prize.id) {
            return Err(DbError::Conflict("Prize already exists".to_string()));
        }
        rows.insert(prize.id.clone(), prize.clone());
        Ok(prize.clone())
    }

    async fn update(&self, id: &str, input: &UpdatePrize) -> DbResult<Option<Prize>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(id).map(|prize| {
            input.apply(prize);
            prize.clone()
        }))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        Ok(self.rows.write().await.remove(id).is_some())
    }

    async fn delete_by_competition(&self, competition_id: &str) -> DbResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, p| p.competition_id != competition_id);
        Ok((before - rows.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// PostgreSQL-backed prize storage.
pub struct PgPrizeRepo {
    pool: PgPool,
}

impl PgPrizeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrizeRepository for PgPrizeRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Prize>> {
        let query = format!("SELECT {COLUMNS} FROM prizes WHERE id = $1");
        Ok(sqlx::query_as::<_, Prize>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, competition_id: Option<&str>) -> DbResult<Vec<Prize>> {
        let query = format!(
            "SELECT {COLUMNS} FROM prizes \
             WHERE ($1::TEXT IS NULL OR competition_id = $1) \
             ORDER BY competition_id, placement"
        );
        Ok(sqlx::query_as::<_, Prize>(&query)
            .bind(competition_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, prize: &Prize) -> DbResult<Prize> {
        let query = format!(
            "INSERT INTO prizes \
             (id, competition_id, title, description, placement, value, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prize>(&query)
            .bind(&prize.id)
            .bind(&prize.competition_id)
            .bind(&prize.title)
            .bind(&prize.description)
            .bind(prize.placement)
            .bind(&prize.value)
            .bind(prize.created_at)
            .bind(prize.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Prize already exists"))
    }

    async fn update(&self, id: &str, input: &UpdatePrize) -> DbResult<Option<Prize>> {
        let query = format!(
            "UPDATE prizes SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                placement = COALESCE($4, placement), \
                value = COALESCE($5, value), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Prize>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.placement)
            .bind(&input.value)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM prizes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_competition(&self, competition_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM prizes WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
