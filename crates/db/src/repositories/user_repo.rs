//! Repository for the `users` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use swing_core::profile::Profile;
use tokio::sync::RwLock;

use crate::error::{map_unique_violation, DbError, DbResult};
use crate::models::user::{UpdateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, google_id, email, name, image, role, onboarding_completed, \
     profile, created_at, updated_at";

const PROFILE_EXISTS: &str = "Profile already exists";

/// Storage operations for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<User>>;
    async fn find_by_google_id(&self, google_id: &str) -> DbResult<Option<User>>;
    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>>;
    /// List users, optionally restricted to one role, oldest first.
    async fn list(&self, role: Option<&str>) -> DbResult<Vec<User>>;
    /// Insert a user. Fails with [`DbError::Conflict`] on a duplicate id,
    /// email or Google subject.
    async fn insert(&self, user: &User) -> DbResult<User>;
    async fn update(&self, id: &str, input: &UpdateUser) -> DbResult<Option<User>>;
    /// Attach a first profile. Fails with [`DbError::Conflict`] when the
    /// user already has one; the check and the write are atomic.
    async fn create_profile(&self, id: &str, profile: &Profile) -> DbResult<Option<User>>;
    async fn set_profile(&self, id: &str, profile: &Profile) -> DbResult<Option<User>>;
    async fn delete(&self, id: &str) -> DbResult<bool>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local user storage.
#[derive(Default)]
pub struct MemUserRepo {
    rows: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for MemUserRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> DbResult<Option<User>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self, role: Option<&str>) -> DbResult<Vec<User>> {
        let rows = self.rows.read().await;
        let mut users: Vec<User> = rows
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn insert(&self, user: &User) -> DbResult<User> {
        let mut rows = self.rows.write().await;
        let duplicate = rows.values().any(|u| {
            u.id == user.id
                || u.email.eq_ignore_ascii_case(&user.email)
                || (user.google_id.is_some() && u.google_id == user.google_id)
        });
        if duplicate {
            return Err(DbError::Conflict("User already exists".to_string()));
        }
        rows.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn update(&self, id: &str, input: &UpdateUser) -> DbResult<Option<User>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(id).map(|user| {
            input.apply(user);
            user.clone()
        }))
    }

    async fn create_profile(&self, id: &str, profile: &Profile) -> DbResult<Option<User>> {
        let mut rows = self.rows.write().await;
        let Some(user) = rows.get_mut(id) else {
            return Ok(None);
        };
        if user.profile.is_some() {
            return Err(DbError::Conflict(PROFILE_EXISTS.to_string()));
        }
        user.profile = Some(Json(profile.clone()));
        user.updated_at = chrono::Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_profile(&self, id: &str, profile: &Profile) -> DbResult<Option<User>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(id).map(|user| {
            user.profile = Some(Json(profile.clone()));
            user.updated_at = chrono::Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        Ok(self.rows.write().await.remove(id).is_some())
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// PostgreSQL-backed user storage.
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepo {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_google_id(&self, google_id: &str) -> DbResult<Option<User>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE google_id = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, role: Option<&str>) -> DbResult<Vec<User>> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE ($1::TEXT IS NULL OR role = $1) \
             ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, user: &User) -> DbResult<User> {
        let query = format!(
            "INSERT INTO users \
             (id, google_id, email, name, image, role, onboarding_completed, profile, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.id)
            .bind(&user.google_id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.image)
            .bind(&user.role)
            .bind(user.onboarding_completed)
            .bind(&user.profile)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "User already exists"))
    }

    async fn update(&self, id: &str, input: &UpdateUser) -> DbResult<Option<User>> {
        let query = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                image = COALESCE($3, image), \
                role = COALESCE($4, role), \
                onboarding_completed = COALESCE($5, onboarding_completed), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.image)
            .bind(&input.role)
            .bind(input.onboarding_completed)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_profile(&self, id: &str, profile: &Profile) -> DbResult<Option<User>> {
        let query = format!(
            "UPDATE users SET profile = $2, updated_at = NOW() \
             WHERE id = $1 AND profile IS NULL \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(Json(profile))
            .fetch_optional(&self.pool)
            .await?;
        match created {
            Some(user) => Ok(Some(user)),
            // No row updated: either the user is missing or already has a profile.
            None => match self.find_by_id(id).await? {
                Some(_) => Err(DbError::Conflict(PROFILE_EXISTS.to_string())),
                None => Ok(None),
            },
        }
    }

    async fn set_profile(&self, id: &str, profile: &Profile) -> DbResult<Option<User>> {
        let query = format!(
            "UPDATE users SET profile = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(Json(profile))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
