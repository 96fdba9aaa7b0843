//! Sale finalization.
//!
//! ## Commit Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   One Database Transaction                      │
//! │                                                                 │
//! │  find open session ──► resolve + decrement each line            │
//! │        │                      │                                 │
//! │        ▼                      ▼                                 │
//! │  total, cash change ──► insert transaction + items              │
//! │        │                                                        │
//! │        ▼                                                        │
//! │  credit session balances ──► COMMIT                             │
//! │                                                                 │
//! │  Any failure before COMMIT rolls everything back: stock,        │
//! │  balances, and ledger rows move together or not at all.         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product lookups run on the transaction's own connection, so the prices
//! and names frozen into the ledger match the stock that was decremented.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use caixa_core::register::{sale_total, settle_cash};
use caixa_core::validation::{validate_amount_cents, validate_quantity, validate_sale_lines};
use caixa_core::{
    CartItem, CoreError, Money, PaymentMethod, Transaction, TransactionItem,
};
use caixa_db::repository::product::ProductRepository;
use caixa_db::repository::session::SessionRepository;
use caixa_db::repository::transaction::{
    generate_item_id, generate_transaction_id, TransactionRepository,
};
use caixa_db::{Database, DbError};

use crate::error::ApiError;

/// One requested line of a sale: a product code and how many.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleLine {
    pub code: String,
    pub quantity: i64,
}

/// Request body for finalizing a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleRequest {
    pub items: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    /// Required for cash payments, ignored otherwise.
    pub received_cents: Option<i64>,
}

/// A finalized sale: the ledger row plus its line items.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

/// A past transaction with its items, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

/// Sale workflows.
#[derive(Clone)]
pub struct SaleService {
    db: Database,
}

impl SaleService {
    pub fn new(db: Database) -> Self {
        SaleService { db }
    }

    /// Finalizes a sale atomically.
    ///
    /// Requires an open register session. Every line must resolve to a known
    /// product with enough stock; cash sales must cover the total. The whole
    /// operation is one database transaction.
    pub async fn finalize(
        &self,
        store_id: &str,
        request: SaleRequest,
    ) -> Result<SaleReceipt, ApiError> {
        validate_sale_lines(request.items.len())?;
        for line in &request.items {
            validate_quantity(line.quantity)?;
        }

        let mut tx = self.db.begin().await?;

        let session = SessionRepository::find_open_in(&mut *tx, store_id)
            .await?
            .ok_or(CoreError::NoOpenSession)?;

        // Resolve and decrement line by line. An insufficient line aborts
        // the whole sale; the rollback restores earlier decrements.
        let mut cart = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = ProductRepository::get_by_code_in(&mut *tx, store_id, &line.code)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.code.clone()))?;

            let decremented =
                ProductRepository::decrement_stock_in(&mut *tx, &product.id, line.quantity)
                    .await?;
            if !decremented {
                return Err(CoreError::InsufficientStock {
                    code: product.code,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            cart.push(CartItem {
                product_id: product.id,
                code: product.code,
                name: product.name,
                unit_price_cents: product.price_cents,
                quantity: line.quantity,
            });
        }

        let total = sale_total(&cart);

        let (received_cents, change_cents) = if request.payment_method.is_cash() {
            let received = request
                .received_cents
                .ok_or_else(|| ApiError::validation("received_cents is required for cash payments"))?;
            validate_amount_cents("received_cents", received)?;
            let change = settle_cash(total, Money::from_cents(received))?;
            (Some(received), Some(change.cents()))
        } else {
            (None, None)
        };

        let created_at = Utc::now();
        let sequence = TransactionRepository::count_for_session_in(&mut *tx, &session.id).await? + 1;

        let transaction = Transaction {
            id: generate_transaction_id(),
            store_id: store_id.to_string(),
            session_id: session.id.clone(),
            display_number: display_number(created_at, sequence),
            total_cents: total.cents(),
            payment_method: request.payment_method,
            received_cents,
            change_cents,
            created_at,
        };
        TransactionRepository::insert_in(&mut *tx, &transaction).await?;

        let mut items = Vec::with_capacity(cart.len());
        for (position, cart_item) in cart.iter().enumerate() {
            let item = TransactionItem {
                id: generate_item_id(),
                transaction_id: transaction.id.clone(),
                product_id: cart_item.product_id.clone(),
                code_snapshot: cart_item.code.clone(),
                name_snapshot: cart_item.name.clone(),
                unit_price_cents: cart_item.unit_price_cents,
                quantity: cart_item.quantity,
                line_total_cents: cart_item.line_total().cents(),
                position: position as i64,
                created_at,
            };
            TransactionRepository::insert_item_in(&mut *tx, &item).await?;
            items.push(item);
        }

        let credited =
            SessionRepository::credit_balances_in(&mut *tx, &session.id, total.cents()).await?;
        if !credited {
            // Session row vanished or closed mid-transaction; abort
            return Err(CoreError::NoOpenSession.into());
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            store_id = %store_id,
            display_number = %transaction.display_number,
            total = %total,
            payment_method = ?transaction.payment_method,
            "sale finalized"
        );

        Ok(SaleReceipt { transaction, items })
    }

    /// Lists a store's most recent transactions with their items.
    pub async fn list_transactions(
        &self,
        store_id: &str,
        limit: u32,
    ) -> Result<Vec<TransactionView>, ApiError> {
        let repo = self.db.transactions();
        let transactions = repo.list_recent(store_id, limit).await?;

        let mut views = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            let items = repo.items_for(&transaction.id).await?;
            views.push(TransactionView { transaction, items });
        }

        Ok(views)
    }
}

/// Human-facing transaction number: sale date plus a per-session sequence,
/// e.g. `20260823-0007`.
fn display_number(at: DateTime<Utc>, sequence: i64) -> String {
    format!("{}-{:04}", at.format("%Y%m%d"), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================
