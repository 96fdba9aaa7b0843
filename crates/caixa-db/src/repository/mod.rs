//! # Repository Module
//!
//! Database repository implementations for Caixa POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Service layer                                                  │
//! │       │  db.sessions().find_open("store-1")                     │
//! │       ▼                                                         │
//! │  SessionRepository / ProductRepository / TransactionRepository  │
//! │       │  SQL                                                    │
//! │       ▼                                                         │
//! │  SQLite                                                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQL lives only here. Methods on the repository structs run against the
//! pool; `*_in` associated functions take `&mut SqliteConnection` so the
//! service layer can compose them inside one database transaction.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Inventory reads and stock decrements
//! - [`session::SessionRepository`] - Register session lifecycle rows
//! - [`transaction::TransactionRepository`] - Sales ledger (immutable rows)

pub mod product;
pub mod session;
pub mod transaction;
