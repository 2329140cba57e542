//! # Low-Stock Alerting
//!
//! Scans the product table for items at or below a threshold and turns
//! the findings into persisted notifications.
//!
//! ## Two Paths, One Store
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Digest path (periodic / on-demand)                                     │
//! │    check_low_stock(threshold)                                           │
//! │        │  SELECT ... WHERE quantity <= threshold                        │
//! │        ▼                                                                 │
//! │    send_low_stock_notifications(user, threshold)                        │
//! │        │  drop items already alerted in the last 24h  ← dedup window    │
//! │        ▼                                                                 │
//! │    one warning notification per surviving item, single batch insert     │
//! │                                                                         │
//! │  Immediate path (after a stock-decreasing mutation)                     │
//! │    check_and_notify_low_stock(user, product, new_stock, threshold)      │
//! │        │  no-op when new_stock > threshold                              │
//! │        ▼                                                                 │
//! │    one notification, severity-escalated, NO dedup - every crossing      │
//! │    of the threshold is reported                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::repository::notification::NotificationRepository;
use depot_core::alert::{
    build_digest_notification, build_immediate_notification, LowStockDigest, LowStockItem,
    LOW_STOCK_TITLE,
};
use depot_core::validation::{validate_stock_count, validate_threshold};
use depot_core::{CoreError, CoreResult, Notification, ALERT_DEDUP_WINDOW_HOURS};

/// The low-stock alert engine.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    pool: SqlitePool,
}

impl AlertEngine {
    /// Creates a new AlertEngine over a connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        AlertEngine { pool }
    }

    fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.pool.clone())
    }

    /// Scans for products at or below `threshold`, lowest stock first.
    ///
    /// A product at exactly the threshold is included; the scan is
    /// read-only and writes nothing.
    pub async fn check_low_stock(&self, threshold: i64) -> CoreResult<Vec<LowStockItem>> {
        validate_threshold(threshold)?;

        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT id AS product_id, name, quantity AS current_stock,
                   ?1 AS threshold, category_id
            FROM products
            WHERE quantity <= ?1
            ORDER BY quantity ASC, name ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::Storage(e.to_string()))?;

        debug!(threshold, count = items.len(), "Low-stock scan");
        Ok(items)
    }

    /// Runs a low-stock scan and persists one warning notification per
    /// item the user has not already been alerted about in the last
    /// 24 hours.
    ///
    /// Dedup matches the product name as a substring of recent alert
    /// message bodies; two products whose names contain each other can
    /// suppress one another's alerts within the window. An empty scan
    /// writes nothing.
    pub async fn send_low_stock_notifications(
        &self,
        user_id: &str,
        threshold: i64,
    ) -> CoreResult<LowStockDigest> {
        let items = self.check_low_stock(threshold).await?;
        if items.is_empty() {
            return Ok(LowStockDigest::default());
        }

        let since = Utc::now() - Duration::hours(ALERT_DEDUP_WINDOW_HOURS);
        let recent = self
            .notifications()
            .list_recent_inventory_warnings(user_id, LOW_STOCK_TITLE, since)
            .await
            .map_err(|e| e.into_core())?;

        let fresh: Vec<&LowStockItem> = items
            .iter()
            .filter(|item| !already_alerted(&recent, &item.name))
            .collect();

        let inputs: Vec<_> = fresh
            .iter()
            .map(|item| build_digest_notification(user_id, item))
            .collect();

        let inserted = self
            .notifications()
            .insert_many(&inputs)
            .await
            .map_err(|e| e.into_core())?;

        info!(
            user_id,
            threshold,
            low = items.len(),
            sent = inserted.len(),
            "Low-stock digest"
        );

        Ok(LowStockDigest {
            sent: inserted.len(),
            notifications: inputs,
        })
    }

    /// Immediate alert after a stock-decreasing mutation.
    ///
    /// No dedup window applies: every threshold crossing is reported,
    /// with severity escalating to critical in the bottom half of the
    /// threshold range. Returns `None` when the stock is still above
    /// the threshold.
    pub async fn check_and_notify_low_stock(
        &self,
        user_id: &str,
        product_id: &str,
        new_stock: i64,
        threshold: i64,
    ) -> CoreResult<Option<Notification>> {
        validate_threshold(threshold)?;
        validate_stock_count(new_stock)?;

        if new_stock > threshold {
            return Ok(None);
        }

        let item = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT id AS product_id, name, ?2 AS current_stock,
                   ?3 AS threshold, category_id
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(new_stock)
        .bind(threshold)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::Storage(e.to_string()))?
        .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        let input = build_immediate_notification(user_id, &item);
        let notification = self
            .notifications()
            .insert(&input)
            .await
            .map_err(|e| e.into_core())?;

        info!(
            user_id,
            product = %item.name,
            stock = new_stock,
            kind = %notification.kind.as_str(),
            "Immediate low-stock alert"
        );

        Ok(Some(notification))
    }
}

/// True when any recent alert's message mentions the product by name.
fn already_alerted(recent: &[Notification], product_name: &str) -> bool {
    recent.iter().any(|n| n.message.contains(product_name))
}

// =============================================================================
// Unit Tests
// =============================================================================
