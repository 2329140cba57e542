//! # Depot Database
//!
//! SQLite persistence and the two services built on it: the stock ledger
//! and the low-stock alert engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        depot-db Crate Structure                         │
//! │                                                                         │
//! │  Database (pool.rs)                                                     │
//! │  ├── products() ──────► ProductRepository                               │
//! │  ├── locations() ─────► LocationRepository                              │
//! │  ├── transactions() ──► TransactionRepository                           │
//! │  ├── notifications() ─► NotificationRepository                          │
//! │  ├── activity() ──────► ActivityRepository                              │
//! │  ├── ledger() ────────► StockLedger     (atomic sells, capacity)        │
//! │  └── alerts() ────────► AlertEngine     (threshold scans, dedup)        │
//! │                                                                         │
//! │  Repositories own the SQL; services own the rules and compose           │
//! │  executor-generic writers into storage transactions.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use depot_db::{Database, DbConfig};
//! use depot_core::{NewProduct, Principal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(DbConfig::new("depot.db")).await?;
//!     let admin = Principal::new("u1", "admin");
//!
//!     let product = db.ledger()
//!         .create_product(
//!             &NewProduct {
//!                 barcode: "8850999320113".into(),
//!                 name: "Green Tea 500ml".into(),
//!                 category_id: None,
//!                 stock_location_id: None,
//!                 quantity: 24,
//!                 cost_cents: 900,
//!                 price_cents: 1500,
//!             },
//!             &admin,
//!         )
//!         .await?;
//!
//!     let outcome = db.ledger().sell(&product.id, 3, &admin).await?;
//!     println!("profit: {} cents", outcome.transaction.profit_cents);
//!     Ok(())
//! }
//! ```

pub mod alerting;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use alerting::AlertEngine;
pub use error::{DbError, DbResult};
pub use ledger::{SaleOutcome, StockLedger};
pub use pool::{Database, DbConfig};

pub use repository::activity::ActivityRepository;
pub use repository::location::LocationRepository;
pub use repository::notification::{ListOptions, NotificationRepository};
pub use repository::product::{ProductRepository, StockUpdate};
pub use repository::transaction::TransactionRepository;
