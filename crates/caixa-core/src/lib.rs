//! # caixa-core: Pure Business Logic for Caixa POS
//!
//! This crate contains the register's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caixa POS Architecture                      │
//! │                                                                 │
//! │  HTTP handlers (apps/server)                                    │
//! │        │                                                        │
//! │        ▼                                                        │
//! │  ★ caixa-core (THIS CRATE) ★                                    │
//! │    types • money • register math • validation                   │
//! │    NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │
//! │        │                                                        │
//! │        ▼                                                        │
//! │  caixa-db (SQLite repositories)                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, RegisterSession, Transaction, ...)
//! - [`money`] - Money type with integer-cents arithmetic (no floats!)
//! - [`register`] - Session balance math, sale totals, cash settlement
//! - [`error`] - Domain error types
//! - [`validation`] - Boundary input validation
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, same input = same output
//! 2. **Integer money**: all monetary values are cents (i64)
//! 3. **Explicit errors**: typed enums, never strings or panics
//!
//! ## Example
//!
//! ```rust
//! use caixa_core::money::Money;
//! use caixa_core::register::settle_cash;
//!
//! let total = Money::from_cents(10_000);     // R$ 100.00
//! let received = Money::from_cents(12_000);  // R$ 120.00
//!
//! let change = settle_cash(total, received).unwrap();
//! assert_eq!(change.cents(), 2_000);         // R$ 20.00 back
//! ```

pub mod error;
pub mod money;
pub mod register;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of line items in a single sale.
///
/// Keeps a runaway request from turning into a pathological database
/// transaction. Could become per-store configuration later.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single item in a sale.
///
/// Guards against typos at the register (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum accepted monetary amount, in cents (R$ 1 billion).
///
/// Every price, balance, and received amount is validated against this
/// bound, which keeps all downstream i64 arithmetic exact:
/// `MAX_AMOUNT_CENTS × MAX_LINE_QUANTITY × MAX_SALE_LINES` is still four
/// orders of magnitude below `i64::MAX`, so line totals, sale totals, and
/// accumulated session balances cannot overflow.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;
