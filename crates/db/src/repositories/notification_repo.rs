//! Repository for the `notifications` table.

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::DbResult;
use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, kind, title, message, link, is_read, read_at, created_at";

/// Storage operations for user notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> DbResult<Notification>;
    /// List a user's notifications, newest first.
    ///
    /// When `unread_only` is `true`, only unread notifications are returned.
    async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Notification>>;
    /// Mark one notification read. Returns `true` if an unread notification
    /// owned by `user_id` was updated.
    async fn mark_read(&self, id: &str, user_id: &str) -> DbResult<bool>;
    /// Mark all of a user's unread notifications read, returning how many.
    async fn mark_all_read(&self, user_id: &str) -> DbResult<u64>;
    async fn unread_count(&self, user_id: &str) -> DbResult<i64>;
    /// Delete a notification owned by `user_id`.
    async fn delete(&self, id: &str, user_id: &str) -> DbResult<bool>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local notification storage (insertion ordered).
#[derive(Default)]
pub struct MemNotificationRepo {
    rows: RwLock<Vec<Notification>>,
}

#[async_trait]
impl NotificationRepository for MemNotificationRepo {
    async fn insert(&self, notification: &Notification) -> DbResult<Notification> {
        self.rows.write().await.push(notification.clone());
        Ok(notification.clone())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Notification>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .skip(usize::try_from(offset.max(0)).unwrap_or(0))
            .take(usize::try_from(limit.max(0)).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let mut rows = self.rows.write().await;
        match rows
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id && !n.is_read)
        {
            Some(n) => {
                n.is_read = true;
                n.read_at = Some(chrono::Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: &str) -> DbResult<u64> {
        let mut rows = self.rows.write().await;
        let now = chrono::Utc::now();
        let mut marked = 0;
        for n in rows
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            n.read_at = Some(now);
            marked += 1;
        }
        Ok(marked)
    }

    async fn unread_count(&self, user_id: &str) -> DbResult<i64> {
        let rows = self.rows.read().await;
        let n = rows
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count();
        Ok(i64::try_from(n).unwrap_or(i64::MAX))
    }

    async fn delete(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// PostgreSQL-backed notification storage.
pub struct PgNotificationRepo {
    pool: PgPool,
}

impl PgNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepo {
    async fn insert(&self, notification: &Notification) -> DbResult<Notification> {
        let query = format!(
            "INSERT INTO notifications \
             (id, user_id, kind, title, message, link, is_read, read_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Notification>(&query)
            .bind(&notification.id)
            .bind(&notification.user_id)
            .bind(&notification.kind)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(&notification.link)
            .bind(notification.is_read)
            .bind(notification.read_at)
            .bind(notification.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Notification>> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        Ok(sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn mark_read(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = false",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unread_count(&self, user_id: &str) -> DbResult<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    async fn delete(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
