//! # Register Math
//!
//! Pure balance arithmetic for the cash-register lifecycle.
//!
//! ## The Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   Register Session Lifecycle                    │
//! │                                                                 │
//! │  open(opening_balance)                                          │
//! │       │   current = expected = opening                          │
//! │       ▼                                                         │
//! │  finalize sale ──► sale_total(items)                            │
//! │       │            current += total, expected += total          │
//! │       ▼            (repeat per sale)                            │
//! │  close()                                                        │
//! │       │   balances frozen at their last value                   │
//! │       ▼                                                         │
//! │  reconcile(physical) ──► discrepancy = physical − expected      │
//! │                          (reported, never corrected)            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function over [`Money`] and [`CartItem`];
//! persistence and atomicity live in the service layer.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CartItem;

/// Computes the total of a sale.
///
/// Each line is computed independently (unit price × quantity) and the line
/// totals are then summed. There is no compounding rounding across lines:
/// integer-cent math makes every intermediate value exact.
///
/// ## Example
/// ```rust
/// use caixa_core::register::sale_total;
/// use caixa_core::types::CartItem;
///
/// let items = vec![CartItem {
///     product_id: "p-1".into(),
///     code: "AGUA-500".into(),
///     name: "Água mineral 500ml".into(),
///     unit_price_cents: 5_000,
///     quantity: 2,
/// }];
/// assert_eq!(sale_total(&items).cents(), 10_000);
/// ```
pub fn sale_total(items: &[CartItem]) -> Money {
    items.iter().map(CartItem::line_total).sum()
}

/// Settles a cash payment: verifies the received amount covers the total
/// and returns the change due.
///
/// Change is `max(0, received − total)`. It is returned for display only
/// and must never be fed back into session balances — the drawer gains
/// exactly `total`, not `received`.
pub fn settle_cash(total: Money, received: Money) -> CoreResult<Money> {
    if received < total {
        return Err(CoreError::InsufficientPayment {
            total_cents: total.cents(),
            received_cents: received.cents(),
        });
    }
    Ok(received.saturating_sub_zero(total))
}

/// Reconciliation discrepancy: `physical − expected`.
///
/// Negative means the till is short, positive means it is over. The
/// discrepancy is reported to the operator; the expected balance is never
/// overwritten to match the count.
#[inline]
pub fn discrepancy(physical: Money, expected: Money) -> Money {
    physical - expected
}

// =============================================================================
// Unit Tests
// =============================================================================
