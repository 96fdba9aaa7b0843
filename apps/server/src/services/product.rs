//! Product catalog: registration and listing.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use caixa_core::validation::{
    validate_amount_cents, validate_product_code, validate_product_name, validate_quantity,
};
use caixa_core::{CoreError, Product};
use caixa_db::repository::product::generate_product_id;
use caixa_db::{Database, DbError};

use crate::error::ApiError;

/// Request body for registering a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
}

/// Request body for adding stock to a product.
#[derive(Debug, Clone, Deserialize)]
pub struct RestockRequest {
    pub code: String,
    pub quantity: i64,
}

/// Product catalog workflows.
#[derive(Clone)]
pub struct ProductService {
    db: Database,
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        ProductService { db }
    }

    /// Registers a product. Fails with 409 when the code is already taken
    /// in this store.
    pub async fn create(
        &self,
        store_id: &str,
        request: CreateProductRequest,
    ) -> Result<Product, ApiError> {
        validate_product_code(&request.code)?;
        validate_product_name(&request.name)?;
        validate_amount_cents("price_cents", request.price_cents)?;
        validate_amount_cents("stock", request.stock)?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            store_id: store_id.to_string(),
            code: request.code.trim().to_string(),
            name: request.name.trim().to_string(),
            category: request.category,
            price_cents: request.price_cents,
            stock: request.stock,
            created_at: now,
            updated_at: now,
        };

        match self.db.products().insert(&product).await {
            Ok(()) => {}
            Err(DbError::UniqueViolation { .. }) => {
                return Err(ApiError::conflict(
                    "duplicate_code",
                    format!("product code already exists: {}", product.code),
                ));
            }
            Err(other) => return Err(other.into()),
        }

        info!(store_id = %store_id, code = %product.code, "product registered");

        Ok(product)
    }

    /// Adds stock to an existing product.
    pub async fn restock(
        &self,
        store_id: &str,
        request: RestockRequest,
    ) -> Result<Product, ApiError> {
        validate_product_code(&request.code)?;
        validate_quantity(request.quantity)?;

        let product = self
            .db
            .products()
            .restock(store_id, request.code.trim(), request.quantity)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(request.code.clone()))?;

        info!(
            store_id = %store_id,
            code = %product.code,
            stock = product.stock,
            "product restocked"
        );

        Ok(product)
    }

    /// Lists a store's products, ordered by name.
    pub async fn list(&self, store_id: &str, limit: u32) -> Result<Vec<Product>, ApiError> {
        Ok(self.db.products().list(store_id, limit).await?)
    }
}
