//! # Transaction Repository
//!
//! Database operations for the sales ledger.
//!
//! Transactions are immutable: there are insert and read operations here,
//! and nothing else. Inserts only happen inside the sale commit transaction
//! (`*_in` functions), so a transaction row never exists without its items,
//! stock decrement, and balance credit.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use caixa_core::{Transaction, TransactionItem};

const TX_COLUMNS: &str = "id, store_id, session_id, display_number, total_cents, \
     payment_method, received_cents, change_cents, created_at";

const ITEM_COLUMNS: &str = "id, transaction_id, product_id, code_snapshot, \
     name_snapshot, unit_price_cents, quantity, line_total_cents, position, created_at";

/// Repository for sales-ledger database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Lists a store's most recent transactions.
    pub async fn list_recent(&self, store_id: &str, limit: u32) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions \
             WHERE store_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Lists all transactions belonging to a session, oldest first.
    pub async fn list_for_session(&self, session_id: &str) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions \
             WHERE session_id = ?1 ORDER BY created_at"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Gets the items of a transaction in rung-up order.
    pub async fn items_for(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM transaction_items \
             WHERE transaction_id = ?1 ORDER BY position"
        ))
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts transactions already attached to a session, inside the
    /// caller's database transaction. Feeds the display sequence number.
    pub async fn count_for_session_in(
        conn: &mut SqliteConnection,
        session_id: &str,
    ) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE session_id = ?1")
                .bind(session_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(count)
    }

    /// Inserts a transaction row inside a caller-owned database transaction.
    pub async fn insert_in(conn: &mut SqliteConnection, tx: &Transaction) -> DbResult<()> {
        debug!(
            id = %tx.id,
            display_number = %tx.display_number,
            total = %tx.total_cents,
            "inserting transaction"
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, store_id, session_id, display_number, total_cents,
                payment_method, received_cents, change_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.store_id)
        .bind(&tx.session_id)
        .bind(&tx.display_number)
        .bind(tx.total_cents)
        .bind(tx.payment_method)
        .bind(tx.received_cents)
        .bind(tx.change_cents)
        .bind(tx.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts one line item inside a caller-owned database transaction.
    pub async fn insert_item_in(
        conn: &mut SqliteConnection,
        item: &TransactionItem,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO transaction_items (
                id, transaction_id, product_id, code_snapshot, name_snapshot,
                unit_price_cents, quantity, line_total_cents, position, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.transaction_id)
        .bind(&item.product_id)
        .bind(&item.code_snapshot)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.line_total_cents)
        .bind(item.position)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

/// Helper to generate a new transaction ID.
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new transaction item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
