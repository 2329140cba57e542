//! # Repository Module
//!
//! Database repository implementations for Depot.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  StockLedger / AlertEngine                                             │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(id)                                   │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── try_decrement(executor, id, qty)   ← composable into a storage    │
//! │       │                                   transaction by the ledger    │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Executor-generic writers compose into atomic units                  │
//! │  • Easy to exercise against an in-memory database                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product rows + guarded stock updates
//! - [`location::LocationRepository`] - Stock locations + derived stock
//! - [`transaction::TransactionRepository`] - Immutable sale ledger
//! - [`notification::NotificationRepository`] - Notification store
//! - [`activity::ActivityRepository`] - Append-only audit log

pub mod activity;
pub mod location;
pub mod notification;
pub mod product;
pub mod transaction;
