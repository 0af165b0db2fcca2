//! # Database Errors
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Error Handling Flow                               │
//! │                                                                         │
//! │  sqlx::Error                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ◄──── CoreError (rule rejected inside a transaction,          │
//! │       │         e.g. InsufficientStock while appending stock)           │
//! │       ▼                                                                 │
//! │  EngineError (royalty-engine)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use royalty_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate ISBN
    /// - Duplicate username or email
    /// - Second earning row for the same (author, book, year, month)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation (unknown book or author id).
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint or trigger refused the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A domain rule rejected a change inside a transaction; nothing was
    /// committed.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → by SQLite message: UNIQUE / FOREIGN KEY /
///                               CHECK or RAISE(ABORT) / other
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if is_constraint_message(msg) {
                    DbError::ConstraintViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// `RAISE(ABORT, ..)` messages of the ledger triggers in the initial schema.
const LEDGER_TRIGGER_MESSAGES: [&str; 3] = [
    "sales are immutable",
    "sales cannot be deleted",
    "cumulative sales figures cannot decrease",
];

fn is_constraint_message(msg: &str) -> bool {
    msg.starts_with("CHECK constraint failed") || LEDGER_TRIGGER_MESSAGES.contains(&msg)
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: DbError = CoreError::InsufficientStock {
            book_id: "b1".to_string(),
            available: 2,
            requested: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for book b1: available 2, requested 3"
        );
    }

    #[test]
    fn test_constraint_messages() {
        assert!(is_constraint_message("CHECK constraint failed: quantity > 0"));
        assert!(is_constraint_message("sales are immutable"));
        assert!(is_constraint_message("sales cannot be deleted"));
        assert!(is_constraint_message("cumulative sales figures cannot decrease"));

        assert!(!is_constraint_message("cannot start a transaction within a transaction"));
        assert!(!is_constraint_message("cannot commit - no transaction is active"));
        assert!(!is_constraint_message("database table is locked"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
