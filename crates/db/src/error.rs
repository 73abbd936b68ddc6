//! Storage error type shared by every repository backend.

/// Errors returned by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A uniqueness rule was violated (duplicate registration, email, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other database failure.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// PostgreSQL unique constraint violation.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Convert a sqlx error, turning unique violations into [`DbError::Conflict`].
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
            return DbError::Conflict(message.to_string());
        }
    }
    DbError::Sqlx(err)
}
