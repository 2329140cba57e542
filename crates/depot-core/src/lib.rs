//! # depot-core: Pure Business Logic for Depot
//!
//! This crate is the **heart** of the Depot stock subsystem. It contains all
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Depot Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Callers (UI / scheduler / API)                 │   │
//! │  │     create_product, sell, adjust_quantity, digest sweep         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ depot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   auth    │  │   alert   │  │ promptpay │  │   │
//! │  │   │  Product  │  │   Role    │  │ Severity  │  │ TLV + CRC │  │   │
//! │  │   │  Txn/Notif│  │ Principal │  │ templates │  │  payload  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   depot-db (Storage Layer)                      │   │
//! │  │        SQLite, stock ledger, alert engine, notif store          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, Notification, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`auth`] - Role/permission authorization model
//! - [`alert`] - Low-stock severity classification
//! - [`promptpay`] - Merchant-presented PromptPay QR payload builder
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are minor units (i64) to avoid float errors
//! 4. **Fail Closed**: Authorization resolves every lookup failure to denial

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alert;
pub mod auth;
pub mod error;
pub mod money;
pub mod promptpay;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use depot_core::Money` instead of
// `use depot_core::money::Money`

pub use alert::Severity;
pub use auth::{Principal, Role};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted for a single sale or adjustment.
///
/// ## Business Reason
/// Rejects absurd over-entry (a scanner stuck in a loop, a pasted id in
/// the quantity field) while staying far above any realistic single
/// mutation. Can be made configurable per deployment in future versions.
pub const MAX_MUTATION_QUANTITY: i64 = 1_000_000;

/// Rolling lookback window (in hours) for low-stock alert deduplication.
///
/// The digest sweep sends at most one notification per product per user
/// within this window. The immediate per-sale path intentionally skips it.
pub const ALERT_DEDUP_WINDOW_HOURS: i64 = 24;
