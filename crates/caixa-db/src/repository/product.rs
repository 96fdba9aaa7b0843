//! # Product Repository
//!
//! Database operations for the product inventory.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Stock Decrement Strategy                       │
//! │                                                                 │
//! │  ❌ WRONG: read stock, check in Rust, write new value           │
//! │     Two concurrent sales both read stock=3, both write — the   │
//! │     inventory is oversubscribed.                                │
//! │                                                                 │
//! │  ✅ CORRECT: conditional single-statement decrement             │
//! │     UPDATE products SET stock = stock - ?                      │
//! │     WHERE id = ? AND stock >= ?                                 │
//! │                                                                 │
//! │     rows_affected == 0 means insufficient stock; the check     │
//! │     and the decrement are one atomic statement.                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use caixa_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists a store's products ordered by name.
    pub async fn list(&self, store_id: &str, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, store_id, code, name, category, price_cents, stock,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its store-scoped code.
    pub async fn get_by_code(&self, store_id: &str, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, store_id, code, name, category, price_cents, stock,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1 AND code = ?2
            "#,
        )
        .bind(store_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Adds stock to a product, returning the updated row.
    ///
    /// Additive single-statement update; safe against concurrent sales
    /// decrementing the same row.
    pub async fn restock(
        &self,
        store_id: &str,
        code: &str,
        quantity: i64,
    ) -> DbResult<Option<Product>> {
        debug!(store_id = %store_id, code = %code, quantity = %quantity, "restocking product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock + ?3, updated_at = ?4
            WHERE store_id = ?1 AND code = ?2
            RETURNING id, store_id, code, name, category, price_cents, stock,
                      created_at, updated_at
            "#,
        )
        .bind(store_id)
        .bind(code)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by code inside a caller-owned transaction.
    ///
    /// The sale commit path reads prices and names through the same
    /// connection it decrements stock on, so a sale sees a consistent
    /// snapshot of the inventory.
    pub async fn get_by_code_in(
        conn: &mut SqliteConnection,
        store_id: &str,
        code: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, store_id, code, name, category, price_cents, stock,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1 AND code = ?2
            "#,
        )
        .bind(store_id)
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// Fails with `DbError::UniqueViolation` when the code already exists
    /// for this store.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, store_id = %product.store_id, "inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, code, name, category, price_cents, stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Decrements stock inside a caller-owned transaction.
    ///
    /// Returns `false` when the product row exists but has less stock than
    /// requested (the statement matched no row). The caller decides whether
    /// that is "insufficient stock" or "unknown product"; it must roll the
    /// transaction back either way.
    pub async fn decrement_stock_in(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        debug!(product_id = %product_id, quantity = %quantity, "decrementing stock");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
