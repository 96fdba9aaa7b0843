//! # Error Types
//!
//! Domain-specific error types for caixa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  caixa-core errors (this file)                                  │
//! │  ├── CoreError        - Business rule violations                │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  caixa-db errors (separate crate)                               │
//! │  └── DbError          - Database operation failures             │
//! │                                                                 │
//! │  Server errors (apps/server)                                    │
//! │  └── ApiError         - What callers see (kind + message)       │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP status     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in the message (code, amounts), not just a label
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every failed operation surfaces one of these; the server maps them to
/// HTTP statuses. None are retried by the core — retry is a client concern.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A register session is already open for this store.
    ///
    /// Opening never creates a second open session; the caller must close
    /// the existing one first.
    #[error("a register session is already open for this store")]
    SessionAlreadyOpen,

    /// No register session exists to close or reconcile.
    #[error("no register session found for this store")]
    SessionNotFound,

    /// A sale was attempted while the register is closed.
    #[error("no open register session; open the register before selling")]
    NoOpenSession,

    /// Product code does not exist in this store's inventory.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Requested quantity exceeds available stock.
    ///
    /// Names the offending product so the operator can fix the cart.
    /// The sale is all-or-nothing: nothing was decremented.
    #[error("insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Cash received is less than the sale total.
    #[error("insufficient payment: total {total_cents} cents, received {received_cents} cents")]
    InsufficientPayment {
        total_cents: i64,
        received_cents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised at the boundary before business logic
/// runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. bad product code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A sale must contain at least one item.
    #[error("sale must contain at least one item")]
    EmptySale,
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
