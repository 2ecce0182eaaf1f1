//! Database error types

use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored value could not be mapped back to a domain type
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl DbError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Map a unique-constraint violation on `constraint` to [`DbError::Duplicate`]
/// Conflict message for a contact held by another live patient
pub(crate) const DUPLICATE_CONTACT_MESSAGE: &str = "Patient with this contact already exists";

pub(crate) fn map_unique_violation(
    err: sqlx::Error,
    constraint: &str,
    message: impl FnOnce() -> String,
) -> DbError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.constraint() == Some(constraint) {
            return DbError::Duplicate(message());
        }
    }
    DbError::Query(err)
}
