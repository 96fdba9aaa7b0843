//! # caixa-db: Database Layer for Caixa POS
//!
//! SQLite persistence for the register, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Caixa POS Data Flow                        │
//! │                                                                 │
//! │  Service layer (apps/server)                                    │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 caixa-db (THIS CRATE)                   │   │
//! │  │                                                         │   │
//! │  │  Database (pool.rs)   Repositories      Migrations      │   │
//! │  │  SqlitePool, WAL      product/session/  (embedded SQL)  │   │
//! │  │  config, health       transaction                       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  SQLite database file (or :memory: in tests)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactional primitives
//!
//! Compound mutations (the sale commit path) must be atomic: stock
//! decrements, balance credits, and row inserts either all land or none do.
//! Repositories therefore expose two flavors of operation:
//!
//! - pool-based methods for single-statement reads/writes, and
//! - `*_in(conn, ...)` associated functions taking `&mut SqliteConnection`
//!   so the caller can compose them inside one `BEGIN ... COMMIT`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caixa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("caixa.db")).await?;
//! let open = db.sessions().find_open("store-1").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use repository::session::SessionRepository;
pub use repository::transaction::TransactionRepository;
