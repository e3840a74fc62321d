//! # Error Types
//!
//! Domain-specific error types for fluxo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fluxo-core errors (this file)                                         │
//! │  ├── CoreError        - Ledger / session rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  fluxo-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  fluxo-desk errors (host app)                                          │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is a logical failure: recoverable at the call site and
//! never worth retrying automatically.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger, stock and session rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced product, transaction or session does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Applying the delta would leave the product below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Ring sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Coca-Cola 350ml", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Sale rejected, no stock or ledger change
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// `open` was called while another session is still open.
    #[error("A cash session is already open: {session_id}")]
    AlreadyOpen { session_id: String },

    /// The operation needs an open cash session and there is none.
    #[error("No cash session is open")]
    NoOpenSession,

    /// The transaction was cancelled before.
    #[error("Transaction {transaction_id} is already cancelled")]
    AlreadyCancelled { transaction_id: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn product_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "Product",
            id: id.into(),
        }
    }

    pub fn transaction_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "Transaction",
            id: id.into(),
        }
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "Cash session",
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. an imported transaction id already in the ledger).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
