//! Database error types
//!
//! The adapter only needs to tell two failures apart when reversing a claim:
//! the claim row is missing, or a reversal already exists. Everything else is
//! reported to the domain as an opaque storage error.

use domain_claims::ClaimError;
use thiserror::Error;

/// PostgreSQL SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database never accepted a connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// The server rejected a statement
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row the operation depends on does not exist
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A unique key is already taken
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Driver-level failure (I/O, pool timeout, decoding)
    #[error("SQL error: {0}")]
    Sql(#[source] sqlx::Error),
}

impl DatabaseError {
    /// A missing row, named by entity and key
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Claim", "0b1c");
    /// assert_eq!(error.to_string(), "Entity not found: Claim with id '0b1c' not found");
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// A taken unique key, named by entity, column and value
    pub fn duplicate(entity: &str, field: &str, value: impl std::fmt::Display) -> Self {
        DatabaseError::DuplicateEntry(format!(
            "{} with {} '{}' already exists",
            entity, field, value
        ))
    }
}

/// Unique violations become [`DatabaseError::DuplicateEntry`] so a reversal
/// that loses the race on `reversals.claim_id` is still reported as a conflict
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    DatabaseError::DuplicateEntry(message)
                } else {
                    DatabaseError::QueryFailed(message)
                }
            }
            _ => DatabaseError::Sql(error),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

impl From<DatabaseError> for ClaimError {
    fn from(error: DatabaseError) -> Self {
        ClaimError::Storage(error.to_string())
    }
}
