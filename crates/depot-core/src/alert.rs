//! # Low-Stock Alert Rules
//!
//! Pure classification and templating for low-stock alerts. The I/O side
//! (scanning stock, deduplication, persistence) lives in `depot-db`; this
//! module owns the deterministic rules it applies.
//!
//! ## Severity Escalation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  threshold = 10                                                         │
//! │                                                                         │
//! │  stock:  0  1  2  3  4  5 │ 6  7  8  9  10 │ 11 ...                    │
//! │          └────critical────┘ └───warning────┘ └─ no alert               │
//! │                                                                         │
//! │  Critical iff stock ≤ max(1, threshold / 2)   (integer floor)          │
//! │  The max(1, …) keeps a zero/one threshold from losing its critical     │
//! │  band entirely.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{NewNotification, NotificationCategory, NotificationKind};

// =============================================================================
// Templates
// =============================================================================

/// Title used by warning-severity alerts and by the digest sweep. The
/// dedup-window query matches on this exact title.
pub const LOW_STOCK_TITLE: &str = "Low Stock Alert";

/// Title used by critical-severity alerts on the immediate path.
pub const CRITICAL_STOCK_TITLE: &str = "Critical Stock Alert";

/// Where alert notifications send the user.
pub const PRODUCT_LIST_URL: &str = "/products";

// =============================================================================
// Severity
// =============================================================================

/// Alert severity for a product's stock level against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    /// Classifies a stock level that is already at or under the threshold.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::alert::Severity;
    ///
    /// assert_eq!(Severity::classify(0, 10), Severity::Critical);
    /// assert_eq!(Severity::classify(8, 10), Severity::Warning);
    /// ```
    pub fn classify(stock: i64, threshold: i64) -> Severity {
        if stock <= (threshold / 2).max(1) {
            Severity::Critical
        } else {
            Severity::Warning
        }
    }

    /// The notification kind this severity maps to.
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Severity::Warning => NotificationKind::Warning,
            Severity::Critical => NotificationKind::Error,
        }
    }

    /// The notification title this severity maps to.
    pub const fn title(&self) -> &'static str {
        match self {
            Severity::Warning => LOW_STOCK_TITLE,
            Severity::Critical => CRITICAL_STOCK_TITLE,
        }
    }
}

// =============================================================================
// Low-Stock Items
// =============================================================================

/// One product flagged by the threshold scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LowStockItem {
    pub product_id: String,
    pub name: String,
    pub current_stock: i64,
    pub threshold: i64,
    pub category_id: Option<String>,
}

/// Result of a digest sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LowStockDigest {
    /// Number of notifications actually inserted.
    pub sent: usize,
    /// The notifications that were built and inserted.
    pub notifications: Vec<NewNotification>,
}

// =============================================================================
// Notification Builders
// =============================================================================

/// Message body for a low-stock notification.
///
/// The digest dedup rule matches the product NAME as a substring of recent
/// message bodies, so the name must appear verbatim here.
pub fn low_stock_message(name: &str, current_stock: i64) -> String {
    format!(
        "{} is running low: only {} left in stock",
        name, current_stock
    )
}

/// Opaque metadata bag attached to every low-stock notification.
pub fn low_stock_metadata(item: &LowStockItem) -> serde_json::Value {
    serde_json::json!({
        "productId": item.product_id,
        "productName": item.name,
        "currentStock": item.current_stock,
        "threshold": item.threshold,
        "category": item.category_id,
    })
}

/// Builds the digest-sweep notification for one flagged product.
///
/// Digest notifications are always warning-severity; escalation applies
/// only on the immediate per-sale path.
pub fn build_digest_notification(user_id: &str, item: &LowStockItem) -> NewNotification {
    NewNotification {
        user_id: user_id.to_string(),
        title: LOW_STOCK_TITLE.to_string(),
        message: low_stock_message(&item.name, item.current_stock),
        kind: NotificationKind::Warning,
        category: NotificationCategory::Inventory,
        action_url: Some(PRODUCT_LIST_URL.to_string()),
        metadata: Some(low_stock_metadata(item)),
    }
}

/// Builds the immediate (post-mutation) notification for one product,
/// applying severity escalation.
pub fn build_immediate_notification(user_id: &str, item: &LowStockItem) -> NewNotification {
    let severity = Severity::classify(item.current_stock, item.threshold);
    NewNotification {
        user_id: user_id.to_string(),
        title: severity.title().to_string(),
        message: low_stock_message(&item.name, item.current_stock),
        kind: severity.kind(),
        category: NotificationCategory::Inventory,
        action_url: Some(PRODUCT_LIST_URL.to_string()),
        metadata: Some(low_stock_metadata(item)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_threshold_ten() {
        // 0 ≤ max(1, 5) ⇒ critical
        assert_eq!(Severity::classify(0, 10), Severity::Critical);
        assert_eq!(Severity::classify(5, 10), Severity::Critical);
        // 8 > 5 ⇒ warning
        assert_eq!(Severity::classify(6, 10), Severity::Warning);
        assert_eq!(Severity::classify(8, 10), Severity::Warning);
    }

    #[test]
    fn test_classify_tiny_thresholds() {
        // threshold/2 floors to 0, max(1, 0) = 1 keeps a critical band
        assert_eq!(Severity::classify(0, 1), Severity::Critical);
        assert_eq!(Severity::classify(1, 1), Severity::Critical);
        assert_eq!(Severity::classify(0, 0), Severity::Critical);

        // odd threshold floors: 7 / 2 = 3
        assert_eq!(Severity::classify(3, 7), Severity::Critical);
        assert_eq!(Severity::classify(4, 7), Severity::Warning);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Severity::Critical.kind(), NotificationKind::Error);
        assert_eq!(Severity::Critical.title(), "Critical Stock Alert");
        assert_eq!(Severity::Warning.kind(), NotificationKind::Warning);
        assert_eq!(Severity::Warning.title(), "Low Stock Alert");
    }

    #[test]
    fn test_message_embeds_name_and_stock() {
        let msg = low_stock_message("Coke 330ml", 3);
        assert!(msg.contains("Coke 330ml"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_digest_notification_shape() {
        let item = LowStockItem {
            product_id: "p1".into(),
            name: "Coke 330ml".into(),
            current_stock: 4,
            threshold: 10,
            category_id: Some("c1".into()),
        };
        let notif = build_digest_notification("u1", &item);

        assert_eq!(notif.kind, NotificationKind::Warning);
        assert_eq!(notif.category, NotificationCategory::Inventory);
        assert_eq!(notif.title, LOW_STOCK_TITLE);
        assert_eq!(notif.action_url.as_deref(), Some("/products"));

        let meta = notif.metadata.unwrap();
        assert_eq!(meta["productId"], "p1");
        assert_eq!(meta["currentStock"], 4);
        assert_eq!(meta["threshold"], 10);
    }

    #[test]
    fn test_immediate_notification_escalates() {
        let item = LowStockItem {
            product_id: "p1".into(),
            name: "Coke 330ml".into(),
            current_stock: 0,
            threshold: 10,
            category_id: None,
        };
        let notif = build_immediate_notification("u1", &item);

        assert_eq!(notif.kind, NotificationKind::Error);
        assert_eq!(notif.title, CRITICAL_STOCK_TITLE);
    }
}
