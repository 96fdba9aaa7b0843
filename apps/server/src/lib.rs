//! # Caixa POS Server
//!
//! HTTP API server for the cash register.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Caixa Server                             │
//! │                                                                 │
//! │  Client ──► HTTP + JWT ──► routes ──► services ──► caixa-db     │
//! │                               │            │                    │
//! │                               ▼            ▼                    │
//! │                          caixa-core     SQLite                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use caixa_db::Database;

use crate::auth::AuthVerifier;
use crate::services::{ProductService, RegisterService, SaleService};

/// Shared application state.
///
/// Cheap to clone: the database wraps an `Arc`-backed pool and the verifier
/// only holds the secret.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthVerifier,
}

impl AppState {
    pub fn new(db: Database, auth: AuthVerifier) -> Self {
        AppState { db, auth }
    }

    pub fn register_service(&self) -> RegisterService {
        RegisterService::new(self.db.clone())
    }

    pub fn sale_service(&self) -> SaleService {
        SaleService::new(self.db.clone())
    }

    pub fn product_service(&self) -> ProductService {
        ProductService::new(self.db.clone())
    }
}
