//! # API Error Type
//!
//! Unified error type returned by every desk command.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command fn ─► Result<T, ApiError>                                      │
//! │                                                                         │
//! │  CoreError::NoOpenSession ────────────► { code: NO_OPEN_SESSION, ... } │
//! │  CoreError::InsufficientStock ────────► { code: INSUFFICIENT_STOCK }    │
//! │  DbError::QueryFailed("...") ─ logged ► { code: DATABASE_ERROR }        │
//! │  ConfigError ─────────────────────────► { code: CONFIG_ERROR }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are safe to show at the counter. Database internals are
//! logged with `tracing::error!` and replaced by a generic message.

use serde::Serialize;

use crate::config::ConfigError;
use crate::state::CartError;
use fluxo_core::CoreError;
use fluxo_db::DbError;

/// What the UI receives when a command fails:
/// ```json
/// { "code": "NO_OPEN_SESSION", "message": "No cash session is open" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    InsufficientStock,
    AlreadyOpen,
    NoOpenSession,
    AlreadyCancelled,
    CartError,
    DatabaseError,
    ConfigError,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::AlreadyOpen { .. } => ErrorCode::AlreadyOpen,
            CoreError::NoOpenSession => ErrorCode::NoOpenSession,
            CoreError::AlreadyCancelled { .. } => ErrorCode::AlreadyCancelled,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::ConstraintViolation(message) => {
                tracing::error!(%message, "Constraint violation on save");
                ApiError::new(ErrorCode::DatabaseError, "Data rejected by the database")
            }
            DbError::Corrupt(message) => {
                tracing::error!(%message, "Stored data is corrupt");
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::ConnectionFailed(message) => {
                tracing::error!(%message, "Database connection failed");
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(message) => {
                tracing::error!(%message, "Database migration failed");
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(message) => {
                tracing::error!(%message, "Database query failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(message) => {
                tracing::error!(%message, "Database transaction failed");
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!(%message, "Foreign key violation");
                ApiError::new(ErrorCode::DatabaseError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(message) => {
                tracing::error!(%message, "Internal database error");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let code = match err {
            CartError::ExceedsStock { .. } => ErrorCode::InsufficientStock,
            _ => ErrorCode::CartError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
