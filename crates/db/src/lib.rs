//! Storage layer: entity models, repository traits and their in-memory and
//! PostgreSQL backends.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;

pub use error::{DbError, DbResult};

use repositories::{
    CompetitionRepository, MemCompetitionRepo, MemNotificationRepo, MemPrizeRepo,
    MemRegistrationRepo, MemUserRepo, MemVoteRepo, NotificationRepository, PgCompetitionRepo,
    PgNotificationRepo, PgPrizeRepo, PgRegistrationRepo, PgUserRepo, PgVoteRepo,
    PrizeRepository, RegistrationRepository, UserRepository, VoteRepository,
};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// The set of repositories injected into the application.
///
/// Cheap to clone; every field is an `Arc`.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub competitions: Arc<dyn CompetitionRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub votes: Arc<dyn VoteRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub prizes: Arc<dyn PrizeRepository>,
    pool: Option<DbPool>,
}

impl Store {
    /// Process-local storage. Contents are lost on restart.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemUserRepo::default()),
            competitions: Arc::new(MemCompetitionRepo::default()),
            registrations: Arc::new(MemRegistrationRepo::default()),
            votes: Arc::new(MemVoteRepo::default()),
            notifications: Arc::new(MemNotificationRepo::default()),
            prizes: Arc::new(MemPrizeRepo::default()),
            pool: None,
        }
    }

    /// PostgreSQL-backed storage sharing one pool.
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(pool.clone())),
            competitions: Arc::new(PgCompetitionRepo::new(pool.clone())),
            registrations: Arc::new(PgRegistrationRepo::new(pool.clone())),
            votes: Arc::new(PgVoteRepo::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepo::new(pool.clone())),
            prizes: Arc::new(PgPrizeRepo::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Name of the active backend, for logs and the health endpoint.
    pub fn backend(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Delete a competition together with its registrations and prizes.
    ///
    /// Votes are never touched. Returns `false` when the competition does
    /// not exist.
    pub async fn delete_competition(&self, id: &str) -> DbResult<bool> {
        if !self.competitions.delete(id).await? {
            return Ok(false);
        }
        let registrations = self.registrations.delete_by_competition(id).await?;
        let prizes = self.prizes.delete_by_competition(id).await?;
        tracing::debug!(competition_id = %id, registrations, prizes, "Competition children removed");
        Ok(true)
    }

    /// Whether the backing store is reachable. Always true in memory.
    pub async fn is_healthy(&self) -> bool {
        match &self.pool {
            Some(pool) => health_check(pool).await.is_ok(),
            None => true,
        }
    }
}
