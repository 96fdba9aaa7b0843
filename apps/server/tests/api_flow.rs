//! End-to-end flows through the HTTP handlers against an in-memory
//! database: register lifecycle, sale finalization, and reconciliation.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use caixa_core::PaymentMethod;
use caixa_db::{Database, DbConfig};
use caixa_server::auth::{AuthVerifier, StoreContext};
use caixa_server::routes::{
    close_register, create_product, create_sale, get_register, list_products,
    list_transactions, open_register, reconcile_register, restock_product, ListQuery,
};
use caixa_server::services::product::{CreateProductRequest, RestockRequest};
use caixa_server::services::register::{OpenRegisterRequest, ReconcileRequest};
use caixa_server::services::sale::{SaleLine, SaleRequest};
use caixa_server::AppState;

const STORE: &str = "store-1";

async fn test_state() -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppState::new(db, AuthVerifier::new("test-secret", 3600))
}

fn ctx() -> StoreContext {
    StoreContext {
        store_id: STORE.to_string(),
        operator: "maria".to_string(),
    }
}

async fn seed_product(state: &AppState, code: &str, price_cents: i64, stock: i64) {
    let request = CreateProductRequest {
        code: code.to_string(),
        name: format!("Produto {code}"),
        category: None,
        price_cents,
        stock,
    };
    let (status, _) = create_product(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
}

async fn open_with_balance(state: &AppState, opening_balance_cents: i64) {
    let request = OpenRegisterRequest {
        operator_name: "Maria".to_string(),
        opening_balance_cents,
    };
    let Json(session) = open_register(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap();
    assert!(session.is_open);
}

async fn open_session(state: &AppState) -> caixa_core::RegisterSession {
    let Json(session) = get_register(State(state.clone()), ctx()).await.unwrap();
    session.expect("register should be open")
}

fn cash_sale(lines: Vec<(&str, i64)>, received_cents: i64) -> SaleRequest {
    SaleRequest {
        items: lines
            .into_iter()
            .map(|(code, quantity)| SaleLine {
                code: code.to_string(),
                quantity,
            })
            .collect(),
        payment_method: PaymentMethod::Cash,
        received_cents: Some(received_cents),
    }
}

async fn product_stock(state: &AppState, code: &str) -> i64 {
    let Json(products) = list_products(
        State(state.clone()),
        ctx(),
        Query(ListQuery { limit: None }),
    )
    .await
    .unwrap();
    products.iter().find(|p| p.code == code).unwrap().stock
}

// =============================================================================
// Register Lifecycle
// =============================================================================

#[tokio::test]
async fn test_full_cash_sale_flow() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 10).await;
    open_with_balance(&state, 20_000).await; // R$ 200.00 in the drawer

    // Two waters at R$ 50.00, paid with R$ 120.00 cash
    let (status, Json(receipt)) = create_sale(
        State(state.clone()),
        ctx(),
        Json(cash_sale(vec![("AGUA-500", 2)], 12_000)),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt.transaction.total_cents, 10_000);
    assert_eq!(receipt.transaction.received_cents, Some(12_000));
    assert_eq!(receipt.transaction.change_cents, Some(2_000));
    assert!(receipt.transaction.display_number.ends_with("-0001"));
    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].quantity, 2);
    assert_eq!(receipt.items[0].line_total_cents, 10_000);

    // Session balance grew by the total, not by the cash handed over
    let session = open_session(&state).await;
    assert_eq!(session.current_balance_cents, 30_000);
    assert_eq!(session.expected_balance_cents, 30_000);

    assert_eq!(product_stock(&state, "AGUA-500").await, 8);

    let Json(views) = list_transactions(
        State(state.clone()),
        ctx(),
        Query(ListQuery { limit: None }),
    )
    .await
    .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].items.len(), 1);
    assert_eq!(views[0].items[0].code_snapshot, "AGUA-500");
}

#[tokio::test]
async fn test_second_open_is_rejected() {
    let state = test_state().await;
    open_with_balance(&state, 10_000).await;

    let request = OpenRegisterRequest {
        operator_name: "José".to_string(),
        opening_balance_cents: 0,
    };
    let err = open_register(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.kind, "register_already_open");
}

#[tokio::test]
async fn test_close_then_reopen_creates_new_session() {
    let state = test_state().await;
    open_with_balance(&state, 10_000).await;

    let first = open_session(&state).await;
    let Json(closed) = close_register(State(state.clone()), ctx()).await.unwrap();
    assert_eq!(closed.id, first.id);
    assert!(!closed.is_open);
    assert!(closed.closed_at.is_some());
    // Balances freeze at close
    assert_eq!(closed.current_balance_cents, 10_000);

    // Closing again: nothing is open. This is a lookup miss, distinct from
    // the no-open-session error a sale gets.
    let err = close_register(State(state.clone()), ctx()).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.kind, "session_not_found");

    open_with_balance(&state, 5_000).await;
    let second = open_session(&state).await;
    assert_ne!(second.id, first.id);
    assert_eq!(second.opening_balance_cents, 5_000);
}

#[tokio::test]
async fn test_get_register_when_closed_is_null() {
    let state = test_state().await;
    let Json(session) = get_register(State(state.clone()), ctx()).await.unwrap();
    assert!(session.is_none());
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_sale_requires_open_register() {
    let state = test_state().await;
    seed_product(&state, "CAFE-500", 2_590, 5).await;

    let err = create_sale(
        State(state.clone()),
        ctx(),
        Json(cash_sale(vec![("CAFE-500", 1)], 5_000)),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.kind, "no_open_session");
    // Nothing was decremented
    assert_eq!(product_stock(&state, "CAFE-500").await, 5);
}

#[tokio::test]
async fn test_over_stock_sale_rolls_back_entirely() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 10).await;
    seed_product(&state, "CAFE-500", 2_590, 1).await;
    open_with_balance(&state, 0).await;

    // First line would succeed, second exceeds stock: all-or-nothing
    let err = create_sale(
        State(state.clone()),
        ctx(),
        Json(cash_sale(vec![("AGUA-500", 3), ("CAFE-500", 2)], 50_000)),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.kind, "insufficient_stock");
    assert_eq!(product_stock(&state, "AGUA-500").await, 10);
    assert_eq!(product_stock(&state, "CAFE-500").await, 1);

    let session = open_session(&state).await;
    assert_eq!(session.current_balance_cents, 0);
}

#[tokio::test]
async fn test_cash_underpayment_is_rejected() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 10).await;
    open_with_balance(&state, 0).await;

    let err = create_sale(
        State(state.clone()),
        ctx(),
        Json(cash_sale(vec![("AGUA-500", 2)], 9_000)),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);
    // Decrement rolled back with the rest of the transaction
    assert_eq!(product_stock(&state, "AGUA-500").await, 10);
}

#[tokio::test]
async fn test_cash_sale_requires_received_amount() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 10).await;
    open_with_balance(&state, 0).await;

    let request = SaleRequest {
        items: vec![SaleLine {
            code: "AGUA-500".to_string(),
            quantity: 1,
        }],
        payment_method: PaymentMethod::Cash,
        received_cents: None,
    };
    let err = create_sale(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_card_sale_has_no_change_bookkeeping() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 10).await;
    open_with_balance(&state, 0).await;

    let request = SaleRequest {
        items: vec![SaleLine {
            code: "AGUA-500".to_string(),
            quantity: 1,
        }],
        payment_method: PaymentMethod::Card,
        received_cents: None,
    };
    let (_, Json(receipt)) = create_sale(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap();

    assert_eq!(receipt.transaction.received_cents, None);
    assert_eq!(receipt.transaction.change_cents, None);

    // Non-cash sales still credit the session balances
    let session = open_session(&state).await;
    assert_eq!(session.current_balance_cents, 5_000);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let state = test_state().await;
    open_with_balance(&state, 0).await;

    let err = create_sale(
        State(state.clone()),
        ctx(),
        Json(cash_sale(vec![("NAO-EXISTE", 1)], 1_000)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.kind, "product_not_found");
}

#[tokio::test]
async fn test_empty_sale_is_rejected() {
    let state = test_state().await;
    open_with_balance(&state, 0).await;

    let request = SaleRequest {
        items: vec![],
        payment_method: PaymentMethod::Pix,
        received_cents: None,
    };
    let err = create_sale(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_display_numbers_increment_per_session() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 100).await;
    open_with_balance(&state, 0).await;

    for expected_suffix in ["-0001", "-0002", "-0003"] {
        let (_, Json(receipt)) = create_sale(
            State(state.clone()),
            ctx(),
            Json(cash_sale(vec![("AGUA-500", 1)], 5_000)),
        )
        .await
        .unwrap();
        assert!(receipt.transaction.display_number.ends_with(expected_suffix));
    }

    // A new session restarts the sequence
    close_register(State(state.clone()), ctx()).await.unwrap();
    open_with_balance(&state, 0).await;
    let (_, Json(receipt)) = create_sale(
        State(state.clone()),
        ctx(),
        Json(cash_sale(vec![("AGUA-500", 1)], 5_000)),
    )
    .await
    .unwrap();
    assert!(receipt.transaction.display_number.ends_with("-0001"));
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn test_reconcile_records_without_adjusting_balances() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 10).await;
    open_with_balance(&state, 20_000).await;
    create_sale(
        State(state.clone()),
        ctx(),
        Json(cash_sale(vec![("AGUA-500", 2)], 10_000)),
    )
    .await
    .unwrap();

    // Drawer counted R$ 295.00 against an expected R$ 300.00
    let request = ReconcileRequest {
        physical_balance_cents: 29_500,
        notes: Some("nota de 5 faltando".to_string()),
    };
    let Json(response) = reconcile_register(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap();

    assert_eq!(response.discrepancy_cents, -500);
    assert_eq!(response.session.physical_balance_cents, Some(29_500));
    // Recording the count never rewrites what the register expected
    assert_eq!(response.session.expected_balance_cents, 30_000);
    assert_eq!(response.session.current_balance_cents, 30_000);
}

#[tokio::test]
async fn test_reconcile_after_close_targets_latest_session() {
    let state = test_state().await;
    open_with_balance(&state, 10_000).await;
    let Json(closed) = close_register(State(state.clone()), ctx()).await.unwrap();

    let request = ReconcileRequest {
        physical_balance_cents: 10_000,
        notes: None,
    };
    let Json(response) = reconcile_register(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap();

    assert_eq!(response.session.id, closed.id);
    assert_eq!(response.discrepancy_cents, 0);
}

#[tokio::test]
async fn test_reconcile_with_no_sessions_is_not_found() {
    let state = test_state().await;

    let request = ReconcileRequest {
        physical_balance_cents: 0,
        notes: None,
    };
    let err = reconcile_register(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.kind, "session_not_found");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_balance_accumulates_over_successive_sales() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 100).await;
    seed_product(&state, "CAFE-500", 2_590, 100).await;
    open_with_balance(&state, 20_000).await;

    let sales = [
        cash_sale(vec![("AGUA-500", 2)], 10_000),
        cash_sale(vec![("CAFE-500", 3)], 10_000),
        cash_sale(vec![("AGUA-500", 1), ("CAFE-500", 1)], 10_000),
    ];
    let mut expected = 20_000;
    for sale in sales {
        let (_, Json(receipt)) = create_sale(State(state.clone()), ctx(), Json(sale))
            .await
            .unwrap();
        expected += receipt.transaction.total_cents;
    }

    // current == opening + Σ totals of all finalized sales
    let session = open_session(&state).await;
    assert_eq!(session.current_balance_cents, expected);
    assert_eq!(session.expected_balance_cents, expected);
}

#[tokio::test]
async fn test_restock_adds_to_existing_stock() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 3).await;

    let request = RestockRequest {
        code: "AGUA-500".to_string(),
        quantity: 7,
    };
    let Json(product) = restock_product(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap();
    assert_eq!(product.stock, 10);

    let missing = RestockRequest {
        code: "NAO-EXISTE".to_string(),
        quantity: 1,
    };
    let err = restock_product(State(state.clone()), ctx(), Json(missing))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_absurd_price_rejected_at_creation() {
    let state = test_state().await;

    // Prices near i64::MAX would break line-total arithmetic downstream;
    // the boundary validator refuses them before they reach storage.
    let request = CreateProductRequest {
        code: "CARO-1".to_string(),
        name: "Produto caro demais".to_string(),
        category: None,
        price_cents: i64::MAX,
        stock: 1,
    };
    let err = create_product(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.kind, "validation");
}

#[tokio::test]
async fn test_duplicate_product_code_conflicts() {
    let state = test_state().await;
    seed_product(&state, "AGUA-500", 5_000, 10).await;

    let request = CreateProductRequest {
        code: "AGUA-500".to_string(),
        name: "Outra água".to_string(),
        category: None,
        price_cents: 4_000,
        stock: 3,
    };
    let err = create_product(State(state.clone()), ctx(), Json(request))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.kind, "duplicate_code");
}
