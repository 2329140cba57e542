//! # Domain Types
//!
//! Core domain types used throughout Depot.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │  Notification   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode (uniq) │   │  totals/profit  │   │  user_id        │       │
//! │  │  quantity ≥ 0   │   │  line items     │   │  kind/category  │       │
//! │  │  price/cost     │   │  immutable      │   │  read flag      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  StockLocation  │   │  ActivityEntry  │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  capacity > 0   │   │  actor/action   │                             │
//! │  │  derived stock  │   │  append-only    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries a UUID v4 string id. Products additionally carry a
//! unique barcode as their business identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// `quantity` is owned exclusively by the Stock Ledger: every mutation goes
/// through an atomic conditional update so the count can never observably go
/// negative. Category and stock-location references are ids into collaborator
/// directories and are not validated on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, etc.) - unique business identifier.
    pub barcode: String,

    /// Display name.
    pub name: String,

    /// Category reference (unvalidated collaborator id).
    pub category_id: Option<String>,

    /// Storage location reference (unvalidated collaborator id).
    pub stock_location_id: Option<String>,

    /// Current stock count. Invariant: never negative.
    pub quantity: i64,

    /// Unit cost in minor units.
    pub cost_cents: i64,

    /// Unit price in minor units.
    pub price_cents: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the unit cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

/// Input for creating a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub category_id: Option<String>,
    pub stock_location_id: Option<String>,
    pub quantity: i64,
    pub cost_cents: i64,
    pub price_cents: i64,
}

/// Partial update for a product's mutable fields.
///
/// `None` means "leave unchanged". Quantity increases for location-assigned
/// products are checked against the location capacity by the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub barcode: Option<String>,
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub stock_location_id: Option<String>,
    pub quantity: Option<i64>,
    pub cost_cents: Option<i64>,
    pub price_cents: Option<i64>,
}

impl ProductPatch {
    /// True when the patch contains no changes.
    pub fn is_empty(&self) -> bool {
        self.barcode.is_none()
            && self.name.is_none()
            && self.category_id.is_none()
            && self.stock_location_id.is_none()
            && self.quantity.is_none()
            && self.cost_cents.is_none()
            && self.price_cents.is_none()
    }
}

// =============================================================================
// Stock Location
// =============================================================================

/// A physical storage location with a declared capacity.
///
/// `current_stock` is derived (SUM of quantity over referencing products)
/// and never stored. Capacity invariant: derived stock ≤ capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLocation {
    pub id: String,
    pub name: String,
    /// Position label (aisle/shelf/bin).
    pub position: String,
    /// Declared capacity. Invariant: > 0.
    pub capacity: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable sale record.
///
/// Once written there is no update path: the store exposes only creation
/// (by the ledger) and listing. Totals are computed by the ledger from the
/// line items at creation time, never trusted from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    /// Sum of `price × quantity` over line items.
    pub total_price_cents: i64,
    /// Sum of `cost × quantity` over line items.
    pub total_cost_cents: i64,
    /// `total_price − total_cost`. May be negative.
    pub profit_cents: i64,
    /// Cashier/user who recorded the sale, when known.
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line item within a transaction.
///
/// Keeps only the product id: line items survive product deletion as a
/// dangling historical reference, resolved by a lookup that may fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in minor units at time of sale.
    pub price_cents: i64,
    /// Unit cost in minor units at time of sale.
    pub cost_cents: i64,
}

/// A transaction together with its ordered line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionWithItems {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// =============================================================================
// Notification
// =============================================================================

/// Visual/semantic kind of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    /// Stable string form (matches storage and wire representation).
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

/// Functional category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    System,
    Inventory,
    Sales,
    User,
    General,
}

impl NotificationCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::System => "system",
            NotificationCategory::Inventory => "inventory",
            NotificationCategory::Sales => "sales",
            NotificationCategory::User => "user",
            NotificationCategory::General => "general",
        }
    }
}

/// A persisted notification.
///
/// Lifecycle: created by a producer (e.g. the alerting engine), then only
/// ever marked read or hard-deleted. Metadata is stored as opaque JSON text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub read: bool,
    pub action_url: Option<String>,
    /// Opaque key/value bag, serialized JSON.
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Parses the opaque metadata bag, if present and well-formed.
    pub fn metadata_value(&self) -> Option<serde_json::Value> {
        self.metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// Input for creating a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub action_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Per-user notification statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total: i64,
    pub unread: i64,
    pub read: i64,
    /// Counts broken down by kind (success/error/warning/info).
    pub by_kind: std::collections::HashMap<String, i64>,
}

// =============================================================================
// Activity Log
// =============================================================================

/// One entry in the append-only audit log.
///
/// Every product create/update/delete records who did what; format beyond
/// `{actor, action, description}` is a collaborator concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActivityEntry {
    pub id: String,
    pub actor_id: String,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_kind_as_str() {
        assert_eq!(NotificationKind::Warning.as_str(), "warning");
        assert_eq!(NotificationKind::Error.as_str(), "error");
        assert_eq!(NotificationCategory::Inventory.as_str(), "inventory");
    }

    #[test]
    fn test_product_money_accessors() {
        let now = Utc::now();
        let product = Product {
            id: "p1".into(),
            barcode: "8850999001234".into(),
            name: "Coke 330ml".into(),
            category_id: None,
            stock_location_id: None,
            quantity: 10,
            cost_cents: 900,
            price_cents: 1500,
            created_at: now,
            updated_at: now,
        };

        assert_eq!((product.price() - product.cost()).cents(), 600);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            quantity: Some(5),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_metadata_value_parses_json() {
        let now = Utc::now();
        let notif = Notification {
            id: "n1".into(),
            user_id: "u1".into(),
            title: "Low Stock Alert".into(),
            message: "Coke 330ml is low".into(),
            kind: NotificationKind::Warning,
            category: NotificationCategory::Inventory,
            read: false,
            action_url: None,
            metadata: Some(r#"{"productId":"p1","currentStock":3}"#.into()),
            created_at: now,
        };

        let value = notif.metadata_value().unwrap();
        assert_eq!(value["currentStock"], 3);
    }
}
