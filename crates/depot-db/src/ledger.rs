//! # Stock Ledger
//!
//! The only path by which `Product.quantity` changes and the sole producer
//! of `Transaction` records. Every mutating operation is gated by the
//! authorization model before any read or write.
//!
//! ## Sell: One Atomic Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sell(product, qty)                                                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├─ UPDATE products SET quantity = quantity - qty                     │
//! │    │  WHERE id = ? AND quantity >= qty      ← guarded, no race window   │
//! │    │       │                                                            │
//! │    │       ├─ 0 rows: probe existence → NotFound | InsufficientStock    │
//! │    │       │          (ROLLBACK, nothing mutated)                       │
//! │    │       ▼                                                            │
//! │    ├─ totals from the product row: price×qty, cost×qty, profit          │
//! │    ├─ INSERT transaction + line item + audit entry                      │
//! │    │       └─ any failure: ROLLBACK, decrement undone, error SURFACES   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A partially-applied sale is never observable to other readers.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::repository::activity::ActivityRepository;
use crate::repository::location::LocationRepository;
use crate::repository::product::{ProductRepository, StockUpdate};
use crate::repository::transaction::{
    generate_item_id, generate_transaction_id, TransactionRepository,
};
use depot_core::validation::{
    validate_amount_cents, validate_barcode, validate_new_product, validate_product_name,
    validate_sale_quantity, validate_stock_count,
};
use depot_core::{
    CoreError, CoreResult, NewProduct, Principal, Product, ProductPatch, Transaction,
    TransactionItem, TransactionWithItems, ValidationError,
};

/// Result of a completed sale: the updated product and the appended
/// transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub product: Product,
    pub transaction: Transaction,
    pub item: TransactionItem,
}

/// The stock ledger service.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger over a connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a product.
    ///
    /// Validation rejects before any write; a barcode collision surfaces
    /// as `DuplicateKey`. No transaction record is created. The audit
    /// entry lands in the same storage transaction as the insert.
    pub async fn create_product(
        &self,
        input: &NewProduct,
        principal: &Principal,
    ) -> CoreResult<Product> {
        principal.require("products:create")?;
        validate_new_product(input)?;

        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let product = ProductRepository::insert_with(&mut *tx, input)
            .await
            .map_err(|e| e.into_core())?;

        ActivityRepository::append_with(
            &mut *tx,
            &principal.user_id,
            "product.create",
            &format!("Created product '{}' ({})", product.name, product.barcode),
        )
        .await
        .map_err(|e| e.into_core())?;

        tx.commit().await.map_err(storage_err)?;

        info!(id = %product.id, barcode = %product.barcode, "Product created");
        Ok(product)
    }

    /// Applies a raw quantity delta (positive or negative).
    ///
    /// The raw stock-count primitive behind manual corrections and the
    /// barcode-scan intake flow: no capacity check, no transaction record.
    /// A delta that would drive the count negative fails with
    /// `InsufficientStock` without mutating. The adjustment and its audit
    /// entry commit together.
    pub async fn adjust_quantity(
        &self,
        product_id: &str,
        delta: i64,
        principal: &Principal,
    ) -> CoreResult<Product> {
        principal.require("products:update_stock")?;
        validate_sale_quantity(delta.abs())?;

        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let update = ProductRepository::try_adjust(&mut *tx, product_id, delta)
            .await
            .map_err(|e| e.into_core())?;

        if update != StockUpdate::Applied {
            let probe = ProductRepository::fetch_by_id(&mut *tx, product_id)
                .await
                .map_err(|e| e.into_core())?;
            return Err(match probe {
                Some(product) => CoreError::InsufficientStock {
                    name: product.name,
                    available: product.quantity,
                    requested: -delta,
                },
                None => CoreError::not_found("Product", product_id),
            });
        }

        let product = ProductRepository::fetch_by_id(&mut *tx, product_id)
            .await
            .map_err(|e| e.into_core())?
            .ok_or_else(|| CoreError::Storage("product vanished mid-adjustment".to_string()))?;

        ActivityRepository::append_with(
            &mut *tx,
            &principal.user_id,
            "product.adjust_quantity",
            &format!(
                "Adjusted stock of '{}' by {delta} (now {})",
                product.name, product.quantity
            ),
        )
        .await
        .map_err(|e| e.into_core())?;

        tx.commit().await.map_err(storage_err)?;

        Ok(product)
    }

    /// Sells a quantity of a product: decrements stock and appends a
    /// transaction, atomically.
    ///
    /// ## Errors
    /// - `NotFound` - no such product (nothing mutated)
    /// - `InsufficientStock` - fewer than `quantity` on hand (nothing mutated)
    /// - `Storage` - a write failed; the whole unit rolled back
    pub async fn sell(
        &self,
        product_id: &str,
        quantity: i64,
        principal: &Principal,
    ) -> CoreResult<SaleOutcome> {
        principal.require("sales:create")?;
        validate_sale_quantity(quantity)?;

        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let update = ProductRepository::try_decrement(&mut *tx, product_id, quantity)
            .await
            .map_err(|e| e.into_core())?;

        if update != StockUpdate::Applied {
            // Guard failed: distinguish missing from short stock, then
            // drop the transaction (implicit rollback, nothing mutated).
            let probe = ProductRepository::fetch_by_id(&mut *tx, product_id)
                .await
                .map_err(|e| e.into_core())?;
            return Err(match probe {
                Some(product) => CoreError::InsufficientStock {
                    name: product.name,
                    available: product.quantity,
                    requested: quantity,
                },
                None => CoreError::not_found("Product", product_id),
            });
        }

        let product = ProductRepository::fetch_by_id(&mut *tx, product_id)
            .await
            .map_err(|e| e.into_core())?
            .ok_or_else(|| CoreError::Storage("product vanished mid-sale".to_string()))?;

        // Totals are computed here from the product row, never trusted
        // from the caller. Profit may be negative.
        let total_price = product
            .price()
            .checked_mul(quantity)
            .ok_or_else(|| monetary_overflow("price"))?;
        let total_cost = product
            .cost()
            .checked_mul(quantity)
            .ok_or_else(|| monetary_overflow("cost"))?;
        let profit = total_price - total_cost;

        let transaction = Transaction {
            id: generate_transaction_id(),
            total_price_cents: total_price.cents(),
            total_cost_cents: total_cost.cents(),
            profit_cents: profit.cents(),
            user_id: Some(principal.user_id.clone()),
            created_at: Utc::now(),
        };
        let item = TransactionItem {
            id: generate_item_id(),
            transaction_id: transaction.id.clone(),
            product_id: product.id.clone(),
            quantity,
            price_cents: product.price_cents,
            cost_cents: product.cost_cents,
        };

        // Any failure from here rolls the decrement back and surfaces.
        TransactionRepository::insert(&mut *tx, &transaction)
            .await
            .map_err(|e| e.into_core())?;
        TransactionRepository::insert_item(&mut *tx, &item)
            .await
            .map_err(|e| e.into_core())?;
        ActivityRepository::append_with(
            &mut *tx,
            &principal.user_id,
            "product.sell",
            &format!(
                "Sold {} × '{}' (stock now {})",
                quantity, product.name, product.quantity
            ),
        )
        .await
        .map_err(|e| e.into_core())?;

        tx.commit().await.map_err(storage_err)?;

        debug!(
            id = %transaction.id,
            product = %product.name,
            qty = %quantity,
            profit_cents = %transaction.profit_cents,
            "Sale recorded"
        );

        Ok(SaleOutcome {
            product,
            transaction,
            item,
        })
    }

    /// Partially updates a product's mutable fields.
    ///
    /// When the update raises the quantity (or moves the product between
    /// locations) and the product ends up assigned to a known location,
    /// the location's capacity invariant is enforced here, inside the
    /// update's storage transaction - not left to caller-side pre-checks.
    pub async fn edit(
        &self,
        product_id: &str,
        patch: &ProductPatch,
        principal: &Principal,
    ) -> CoreResult<Product> {
        principal.require("products:update")?;

        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let existing = ProductRepository::fetch_by_id(&mut *tx, product_id)
            .await
            .map_err(|e| e.into_core())?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        if patch.is_empty() {
            return Ok(existing);
        }

        let mut updated = existing.clone();
        if let Some(barcode) = &patch.barcode {
            validate_barcode(barcode)?;
            updated.barcode = barcode.trim().to_string();
        }
        if let Some(name) = &patch.name {
            validate_product_name(name)?;
            updated.name = name.trim().to_string();
        }
        if let Some(category_id) = &patch.category_id {
            updated.category_id = Some(category_id.clone());
        }
        if let Some(location_id) = &patch.stock_location_id {
            updated.stock_location_id = Some(location_id.clone());
        }
        if let Some(quantity) = patch.quantity {
            validate_stock_count(quantity)?;
            updated.quantity = quantity;
        }
        if let Some(cost) = patch.cost_cents {
            validate_amount_cents("cost", cost)?;
            updated.cost_cents = cost;
        }
        if let Some(price) = patch.price_cents {
            validate_amount_cents("price", price)?;
            updated.price_cents = price;
        }

        let location_changed = updated.stock_location_id != existing.stock_location_id;
        if updated.quantity > existing.quantity || location_changed {
            Self::check_capacity(&mut tx, &existing, &updated).await?;
        }

        // Stamped here so the returned product matches the stored row.
        updated.updated_at = Utc::now();

        ProductRepository::update(&mut *tx, &updated)
            .await
            .map_err(|e| e.into_core())?;

        ActivityRepository::append_with(
            &mut *tx,
            &principal.user_id,
            "product.update",
            &format!("Updated product '{}'", updated.name),
        )
        .await
        .map_err(|e| e.into_core())?;

        tx.commit().await.map_err(storage_err)?;

        Ok(updated)
    }

    /// Capacity invariant: the location's derived stock, with this
    /// product's contribution replaced by its new quantity, must not
    /// exceed the declared capacity. Unknown location ids are skipped -
    /// references into the location directory are not validated.
    async fn check_capacity(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        existing: &Product,
        updated: &Product,
    ) -> CoreResult<()> {
        let Some(location_id) = &updated.stock_location_id else {
            return Ok(());
        };

        let Some(location) = LocationRepository::fetch_by_id(&mut **tx, location_id)
            .await
            .map_err(|e| e.into_core())?
        else {
            return Ok(());
        };

        let mut occupied = LocationRepository::fetch_current_stock(&mut **tx, location_id)
            .await
            .map_err(|e| e.into_core())?;
        if existing.stock_location_id.as_deref() == Some(location_id.as_str()) {
            occupied -= existing.quantity;
        }

        let attempted = occupied + updated.quantity;
        if attempted > location.capacity {
            return Err(CoreError::CapacityExceeded {
                location: location.name,
                capacity: location.capacity,
                attempted,
            });
        }

        Ok(())
    }

    /// Hard-deletes a product, with its audit entry in the same storage
    /// transaction.
    ///
    /// Existing transaction line items keep their dangling reference;
    /// the ledger is an immutable history, not a live join.
    pub async fn remove(&self, product_id: &str, principal: &Principal) -> CoreResult<()> {
        principal.require("products:delete")?;

        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let product = ProductRepository::fetch_by_id(&mut *tx, product_id)
            .await
            .map_err(|e| e.into_core())?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        ProductRepository::delete_with(&mut *tx, product_id)
            .await
            .map_err(|e| e.into_core())?;

        ActivityRepository::append_with(
            &mut *tx,
            &principal.user_id,
            "product.delete",
            &format!("Deleted product '{}' ({})", product.name, product.barcode),
        )
        .await
        .map_err(|e| e.into_core())?;

        tx.commit().await.map_err(storage_err)?;

        info!(id = %product_id, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a product, failing with `NotFound` when absent.
    pub async fn get_product(&self, product_id: &str) -> CoreResult<Product> {
        self.products()
            .get_by_id(product_id)
            .await
            .map_err(|e| e.into_core())?
            .ok_or_else(|| CoreError::not_found("Product", product_id))
    }

    /// Gets a product by barcode, failing with `NotFound` when absent.
    pub async fn get_by_barcode(&self, barcode: &str) -> CoreResult<Product> {
        self.products()
            .get_by_barcode(barcode)
            .await
            .map_err(|e| e.into_core())?
            .ok_or_else(|| CoreError::not_found("Product", barcode))
    }

    /// Lists products, ordered by name.
    pub async fn list_products(&self, limit: u32) -> CoreResult<Vec<Product>> {
        self.products().list(limit).await.map_err(|e| e.into_core())
    }

    /// Bulk transaction listing, newest first.
    pub async fn list_transactions(&self, limit: u32) -> CoreResult<Vec<Transaction>> {
        self.transactions()
            .list(limit)
            .await
            .map_err(|e| e.into_core())
    }

    /// Gets a transaction with its line items.
    pub async fn get_transaction(&self, id: &str) -> CoreResult<TransactionWithItems> {
        self.transactions()
            .get_with_items(id)
            .await
            .map_err(|e| e.into_core())?
            .ok_or_else(|| CoreError::not_found("Transaction", id))
    }
}

fn storage_err(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

fn monetary_overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: format!("total {field}"),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn admin() -> Principal {
        Principal::new("admin-1", "admin")
    }

    fn staff() -> Principal {
        Principal::new("staff-1", "staff")
    }

    fn soda(quantity: i64) -> NewProduct {
        NewProduct {
            barcode: "8850999320113".to_string(),
            name: "Green Tea 500ml".to_string(),
            category_id: None,
            stock_location_id: None,
            quantity,
            cost_cents: 900,
            price_cents: 1500,
        }
    }

    #[tokio::test]
    async fn test_create_product_and_fetch() {
        let db = test_db().await;
        let ledger = db.ledger();

        let product = ledger.create_product(&soda(24), &admin()).await.unwrap();
        assert_eq!(product.quantity, 24);

        let fetched = ledger.get_product(&product.id).await.unwrap();
        assert_eq!(fetched.barcode, "8850999320113");

        let by_barcode = ledger.get_by_barcode("8850999320113").await.unwrap();
        assert_eq!(by_barcode.id, product.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_barcode_rejected() {
        let db = test_db().await;
        let ledger = db.ledger();

        ledger.create_product(&soda(10), &admin()).await.unwrap();
        let err = ledger.create_product(&soda(5), &admin()).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_sell_decrements_and_records_transaction() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        let outcome = ledger.sell(&product.id, 3, &admin()).await.unwrap();

        assert_eq!(outcome.product.quantity, 7);
        // 3 × (1500 - 900) = 1800 cents profit
        assert_eq!(outcome.transaction.total_price_cents, 4500);
        assert_eq!(outcome.transaction.total_cost_cents, 2700);
        assert_eq!(outcome.transaction.profit_cents, 1800);
        assert_eq!(outcome.item.quantity, 3);
        assert_eq!(outcome.item.price_cents, 1500);

        let stored = ledger.get_transaction(&outcome.transaction.id).await.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0].product_id, product.id);
    }

    #[tokio::test]
    async fn test_sell_entire_stock_reaches_zero() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(5), &admin()).await.unwrap();

        let outcome = ledger.sell(&product.id, 5, &admin()).await.unwrap();
        assert_eq!(outcome.product.quantity, 0);
    }

    #[tokio::test]
    async fn test_oversell_leaves_nothing_behind() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(2), &admin()).await.unwrap();

        let err = ledger.sell(&product.id, 3, &admin()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));

        // Stock untouched, no transaction appended.
        let after = ledger.get_product(&product.id).await.unwrap();
        assert_eq!(after.quantity, 2);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sell_unknown_product_is_not_found() {
        let db = test_db().await;
        let err = db.ledger().sell("no-such-id", 1, &admin()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_sell_rejects_non_positive_quantity() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        assert!(ledger.sell(&product.id, 0, &admin()).await.is_err());
        assert!(ledger.sell(&product.id, -1, &admin()).await.is_err());
        assert!(ledger.sell(&product.id, 1_000_001, &admin()).await.is_err());
    }

    #[tokio::test]
    async fn test_revenue_and_profit_accumulate_across_sales() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        ledger.sell(&product.id, 2, &admin()).await.unwrap();
        ledger.sell(&product.id, 3, &admin()).await.unwrap();

        let txns = ledger.list_transactions(50).await.unwrap();
        assert_eq!(txns.len(), 2);

        let revenue: i64 = txns.iter().map(|t| t.total_price_cents).sum();
        let profit: i64 = txns.iter().map(|t| t.profit_cents).sum();
        assert_eq!(revenue, 5 * 1500);
        assert_eq!(profit, 5 * 600);
    }

    #[tokio::test]
    async fn test_adjust_quantity_both_directions() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        let up = ledger.adjust_quantity(&product.id, 5, &admin()).await.unwrap();
        assert_eq!(up.quantity, 15);

        let down = ledger.adjust_quantity(&product.id, -15, &admin()).await.unwrap();
        assert_eq!(down.quantity, 0);

        let err = ledger
            .adjust_quantity(&product.id, -1, &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));

        let after = ledger.get_product(&product.id).await.unwrap();
        assert_eq!(after.quantity, 0);
    }

    #[tokio::test]
    async fn test_edit_applies_patch_fields() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        let patch = ProductPatch {
            name: Some("Green Tea 500ml (new label)".to_string()),
            price_cents: Some(1800),
            ..Default::default()
        };
        let updated = ledger.edit(&product.id, &patch, &admin()).await.unwrap();

        assert_eq!(updated.name, "Green Tea 500ml (new label)");
        assert_eq!(updated.price_cents, 1800);
        // Untouched fields survive.
        assert_eq!(updated.quantity, 10);
        assert_eq!(updated.barcode, product.barcode);
    }

    #[tokio::test]
    async fn test_edit_enforces_location_capacity() {
        let db = test_db().await;
        let ledger = db.ledger();
        let shelf = db.locations().insert("Shelf A", "Aisle 1", 30).await.unwrap();

        let mut input = soda(10);
        input.stock_location_id = Some(shelf.id.clone());
        let product = ledger.create_product(&input, &admin()).await.unwrap();

        let mut other = soda(15);
        other.barcode = "8850999320114".to_string();
        other.name = "Black Tea 500ml".to_string();
        other.stock_location_id = Some(shelf.id.clone());
        ledger.create_product(&other, &admin()).await.unwrap();

        // 15 occupied by the other product; raising this one to 16 would
        // put the shelf at 31 > 30.
        let patch = ProductPatch {
            quantity: Some(16),
            ..Default::default()
        };
        let err = ledger.edit(&product.id, &patch, &admin()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::CapacityExceeded {
                capacity: 30,
                attempted: 31,
                ..
            }
        ));

        // Exactly at capacity is fine.
        let patch = ProductPatch {
            quantity: Some(15),
            ..Default::default()
        };
        let updated = ledger.edit(&product.id, &patch, &admin()).await.unwrap();
        assert_eq!(updated.quantity, 15);
    }

    #[tokio::test]
    async fn test_edit_checks_capacity_when_moving_locations() {
        let db = test_db().await;
        let ledger = db.ledger();
        let small = db.locations().insert("Bin B", "Back room", 5).await.unwrap();

        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        let patch = ProductPatch {
            stock_location_id: Some(small.id.clone()),
            ..Default::default()
        };
        let err = ledger.edit(&product.id, &patch, &admin()).await.unwrap_err();
        assert!(matches!(err, CoreError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn test_remove_keeps_transaction_history() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();
        let outcome = ledger.sell(&product.id, 1, &admin()).await.unwrap();

        ledger.remove(&product.id, &admin()).await.unwrap();

        assert!(matches!(
            ledger.get_product(&product.id).await.unwrap_err(),
            CoreError::NotFound { .. }
        ));

        // The line item keeps its dangling product_id.
        let stored = ledger.get_transaction(&outcome.transaction.id).await.unwrap();
        assert_eq!(stored.items[0].product_id, product.id);

        // The per-product history query resolves it too, deletion or not.
        let history = db
            .transactions()
            .list_items_for_product(&product.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].transaction_id, outcome.transaction.id);
    }

    #[tokio::test]
    async fn test_edit_returns_stored_timestamp() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        let patch = ProductPatch {
            price_cents: Some(1600),
            ..Default::default()
        };
        let updated = ledger.edit(&product.id, &patch, &admin()).await.unwrap();

        let stored = ledger.get_product(&product.id).await.unwrap();
        assert_eq!(updated.updated_at, stored.updated_at);
        assert!(updated.updated_at >= product.updated_at);
    }

    #[tokio::test]
    async fn test_staff_cannot_delete_products() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();

        let err = ledger.remove(&product.id, &staff()).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));

        // Staff CAN sell and adjust stock.
        assert!(ledger.sell(&product.id, 1, &staff()).await.is_ok());
        assert!(ledger.adjust_quantity(&product.id, 5, &staff()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_role_is_denied_everything() {
        let db = test_db().await;
        let ledger = db.ledger();
        let ghost = Principal::new("u9", "superuser");

        let err = ledger.create_product(&soda(1), &ghost).await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_mutations_append_activity_entries() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(10), &admin()).await.unwrap();
        ledger.sell(&product.id, 2, &admin()).await.unwrap();
        ledger.adjust_quantity(&product.id, 5, &admin()).await.unwrap();
        let patch = ProductPatch {
            price_cents: Some(1600),
            ..Default::default()
        };
        ledger.edit(&product.id, &patch, &admin()).await.unwrap();
        ledger.remove(&product.id, &admin()).await.unwrap();

        let entries = db.activity().list(10).await.unwrap();
        let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
        for action in [
            "product.create",
            "product.sell",
            "product.adjust_quantity",
            "product.update",
            "product.delete",
        ] {
            assert!(actions.contains(&action), "missing {action}");
        }
    }

    #[tokio::test]
    async fn test_failed_sell_leaves_no_audit_entry() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product = ledger.create_product(&soda(2), &admin()).await.unwrap();

        ledger.sell(&product.id, 3, &admin()).await.unwrap_err();

        // The audit entry rides the sale's storage transaction: a sale
        // that rolled back never shows up in the log.
        let entries = db.activity().list(10).await.unwrap();
        assert!(entries.iter().all(|e| e.action != "product.sell"));
    }
}
