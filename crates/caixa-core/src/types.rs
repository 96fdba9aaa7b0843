//! # Domain Types
//!
//! Core domain types for the register.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  ┌────────────────┐  ┌──────────────────┐  ┌────────────────┐  │
//! │  │    Product     │  │ RegisterSession  │  │  Transaction   │  │
//! │  │  ────────────  │  │  ──────────────  │  │  ────────────  │  │
//! │  │  id (UUID)     │  │  id (UUID)       │  │  id (UUID)     │  │
//! │  │  code          │  │  is_open         │  │  display_number│  │
//! │  │  price_cents   │  │  *_balance_cents │  │  total_cents   │  │
//! │  │  stock         │  │  opened/closed_at│  │  payment_method│  │
//! │  └────────────────┘  └──────────────────┘  └────────────────┘  │
//! │                                                                 │
//! │  CartItem (ephemeral, in-flight sale) ──► TransactionItem      │
//! │                                           (persisted snapshot)  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - a business identifier (`code`, `display_number`) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale. Stock is decremented by finalized sales
/// and is never allowed to go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this product belongs to.
    pub store_id: String,

    /// Business identifier typed or scanned at the register. Unique per store.
    pub code: String,

    /// Display name shown to the operator and on receipts.
    pub name: String,

    /// Optional category for UI grouping.
    pub category: Option<String>,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Current stock level (never negative).
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the requested quantity can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash. The only method with received/change bookkeeping.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Instant bank transfer.
    Pix,
}

impl PaymentMethod {
    /// Whether this method settles with physical cash in the drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Register Session
// =============================================================================

/// One open-to-close cycle of the cash register, bounding a set of
/// transactions.
///
/// ## Lifecycle
/// ```text
/// CLOSED --open()--> OPEN --close()--> CLOSED
///
/// reconcile() is valid in either state and does not transition;
/// it only records the hand-counted balance and notes.
/// ```
///
/// Balances start equal to the opening balance and are adjusted only by
/// finalized sales until close. Sessions are never deleted; history is
/// append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RegisterSession {
    pub id: String,
    pub store_id: String,
    pub is_open: bool,
    pub operator_name: String,
    pub opening_balance_cents: i64,
    pub current_balance_cents: i64,
    pub expected_balance_cents: i64,
    /// Hand-counted balance, recorded at reconciliation. None until then.
    pub physical_balance_cents: Option<i64>,
    pub reconciliation_notes: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl RegisterSession {
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_cents(self.opening_balance_cents)
    }

    #[inline]
    pub fn current_balance(&self) -> Money {
        Money::from_cents(self.current_balance_cents)
    }

    #[inline]
    pub fn expected_balance(&self) -> Money {
        Money::from_cents(self.expected_balance_cents)
    }

    #[inline]
    pub fn physical_balance(&self) -> Option<Money> {
        self.physical_balance_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line of an in-progress sale. Ephemeral: exists only between request
/// validation and finalization, when it is frozen into a [`TransactionItem`].
///
/// Price and name are snapshotted from the product at resolve time so the
/// persisted sale survives later product edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartItem {
    /// Line total: unit price × quantity, computed independently per line.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A finalized sale. Immutable once created; always references the session
/// that was open at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    pub store_id: String,
    pub session_id: String,
    /// Human-facing sequence, e.g. `20260823-0007`.
    pub display_number: String,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Cash only: amount the customer handed over.
    pub received_cents: Option<i64>,
    /// Cash only: change returned. Informational, never a balance input.
    pub change_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A persisted line item of a finalized sale (snapshot of a [`CartItem`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product code at time of sale (frozen).
    pub code_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity, computed per line before summing.
    pub line_total_cents: i64,
    /// Zero-based position preserving the order items were rung up.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl TransactionItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
