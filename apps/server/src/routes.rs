//! HTTP route handlers.
//!
//! Handlers are thin: extract the store context, hand the body to a
//! service, serialize the result. Status-code decisions live in
//! [`crate::error::ApiError`].

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use caixa_core::{Product, RegisterSession};

use crate::auth::StoreContext;
use crate::error::ApiError;
use crate::services::product::{CreateProductRequest, RestockRequest};
use crate::services::register::{OpenRegisterRequest, ReconcileRequest, ReconcileResponse};
use crate::services::sale::{SaleReceipt, SaleRequest, TransactionView};
use crate::AppState;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/register", get(get_register))
        .route("/api/register/open", post(open_register))
        .route("/api/register/close", post(close_register))
        .route("/api/register/reconcile", post(reconcile_register))
        .route("/api/sales", post(create_sale))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/restock", post(restock_product))
        .route("/api/transactions", get(list_transactions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

impl ListQuery {
    fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
    }
}

// =============================================================================
// Health
// =============================================================================

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({"status": "ok"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "unavailable"})),
        )
    }
}

// =============================================================================
// Register
// =============================================================================

/// Returns the open session, or `null` when the register is closed.
pub async fn get_register(
    State(state): State<AppState>,
    ctx: StoreContext,
) -> Result<Json<Option<RegisterSession>>, ApiError> {
    let session = state.register_service().current(&ctx.store_id).await?;
    Ok(Json(session))
}

pub async fn open_register(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(request): Json<OpenRegisterRequest>,
) -> Result<Json<RegisterSession>, ApiError> {
    let session = state.register_service().open(&ctx.store_id, request).await?;
    Ok(Json(session))
}

pub async fn close_register(
    State(state): State<AppState>,
    ctx: StoreContext,
) -> Result<Json<RegisterSession>, ApiError> {
    let session = state.register_service().close(&ctx.store_id).await?;
    Ok(Json(session))
}

pub async fn reconcile_register(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(request): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let response = state
        .register_service()
        .reconcile(&ctx.store_id, request)
        .await?;
    Ok(Json(response))
}

// =============================================================================
// Sales
// =============================================================================

pub async fn create_sale(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(request): Json<SaleRequest>,
) -> Result<(StatusCode, Json<SaleReceipt>), ApiError> {
    let receipt = state.sale_service().finalize(&ctx.store_id, request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    ctx: StoreContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let views = state
        .sale_service()
        .list_transactions(&ctx.store_id, query.limit())
        .await?;
    Ok(Json(views))
}

// =============================================================================
// Products
// =============================================================================

pub async fn create_product(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.product_service().create(&ctx.store_id, request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn restock_product(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(request): Json<RestockRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state.product_service().restock(&ctx.store_id, request).await?;
    Ok(Json(product))
}

pub async fn list_products(
    State(state): State<AppState>,
    ctx: StoreContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .product_service()
        .list(&ctx.store_id, query.limit())
        .await?;
    Ok(Json(products))
}
