//! # Engine Errors
//!
//! The error type every pipeline operation returns.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError::NotFound            ─┐                                      │
//! │  DbError::NotFound              ─┴──►  NotFound                         │
//! │  CoreError::InvalidArgument     ─┐                                      │
//! │  CoreError::Validation           │                                      │
//! │  DbError::ConstraintViolation    │                                      │
//! │  DbError::ForeignKeyViolation   ─┴──►  InvalidArgument                  │
//! │  CoreError::InsufficientStock   ────►  InsufficientStock                │
//! │  CoreError::Conflict            ─┐                                      │
//! │  DbError::UniqueViolation       ─┴──►  Conflict                         │
//! │  CoreError::Forbidden           ────►  Forbidden                        │
//! │  token rejected                 ────►  Unauthenticated                  │
//! │  any other DbError              ────►  UpstreamFailure                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use royalty_core::CoreError;
use royalty_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Stable classification of an [`EngineError`], for transport layers that
/// map errors to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InsufficientStock,
    Conflict,
    Forbidden,
    Unauthenticated,
    UpstreamFailure,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient stock for book {book_id}: available {available}, requested {requested}")]
    InsufficientStock {
        book_id: String,
        available: i64,
        requested: i64,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Storage failed; the operation had no effect.
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            EngineError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            EngineError::Conflict(_) => ErrorKind::Conflict,
            EngineError::Forbidden(_) => ErrorKind::Forbidden,
            EngineError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            EngineError::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            CoreError::InvalidArgument(msg) => EngineError::InvalidArgument(msg),
            CoreError::Validation(v) => EngineError::InvalidArgument(v.to_string()),
            CoreError::InsufficientStock {
                book_id,
                available,
                requested,
            } => EngineError::InsufficientStock {
                book_id,
                available,
                requested,
            },
            CoreError::Conflict(msg) => EngineError::Conflict(msg),
            CoreError::Forbidden(msg) => EngineError::Forbidden(msg),
        }
    }
}

impl From<royalty_core::ValidationError> for EngineError {
    fn from(err: royalty_core::ValidationError) -> Self {
        EngineError::InvalidArgument(err.to_string())
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => {
                EngineError::Conflict(format!("{field} '{value}' already exists"))
            }
            DbError::ForeignKeyViolation { message } => EngineError::InvalidArgument(message),
            DbError::ConstraintViolation(msg) => EngineError::InvalidArgument(msg),
            DbError::Domain(core) => core.into(),
            other => EngineError::UpstreamFailure(other.to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use royalty_core::ValidationError;

    #[test]
    fn test_core_errors_keep_their_kind() {
        let err: EngineError = CoreError::InsufficientStock {
            book_id: "b1".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);

        let err: EngineError = CoreError::Validation(ValidationError::Required {
            field: "title".to_string(),
        })
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "Invalid argument: title is required");
    }

    #[test]
    fn test_db_errors_map_to_kinds() {
        let err: EngineError = DbError::duplicate("isbn", "9780306406157").into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: EngineError =
            DbError::Domain(CoreError::invalid("quantity must be positive")).into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err: EngineError = DbError::PoolExhausted.into();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::InsufficientStock).unwrap(),
            r#""insufficient_stock""#
        );
    }
}
