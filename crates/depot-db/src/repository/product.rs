//! # Product Repository
//!
//! Database operations for products, including the two atomic quantity
//! primitives the stock ledger is built on.
//!
//! ## Guarded Quantity Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Why Conditional Updates                                 │
//! │                                                                         │
//! │  ❌ WRONG: read-then-write (races under concurrent sells)              │
//! │     let p = get(id);                 // both callers read quantity=5   │
//! │     if p.quantity >= qty { ... }     // both pass the check            │
//! │     UPDATE products SET quantity = 3 // over-sold                      │
//! │                                                                         │
//! │  ✅ CORRECT: single guarded statement                                  │
//! │     UPDATE products SET quantity = quantity - ?q                       │
//! │     WHERE id = ?id AND quantity >= ?q                                  │
//! │                                                                         │
//! │  Zero rows affected means the precondition no longer holds; the        │
//! │  caller distinguishes NotFound from InsufficientStock with an          │
//! │  existence probe and surfaces the failure without mutating.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use depot_core::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, barcode, name, category_id, stock_location_id, \
     quantity, cost_cents, price_cents, created_at, updated_at";

/// Outcome of a guarded quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// The guard held and the row was updated.
    Applied,
    /// Zero rows matched: the row is missing or the guard would go
    /// negative. Callers distinguish the two with an existence probe.
    Insufficient,
}

/// Repository for product database operations.
///
/// Mutating quantity through anything but [`try_decrement`] /
/// [`try_adjust`] bypasses the ledger's invariants; only the ledger and
/// tests should touch those directly.
///
/// [`try_decrement`]: ProductRepository::try_decrement
/// [`try_adjust`]: ProductRepository::try_adjust
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Executor-generic fetch, usable inside a storage transaction.
    pub async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(product)
    }

    /// Gets a product by its barcode (the unique business identifier).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE barcode = ?1",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY name LIMIT ?1",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product and returns it.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the barcode already exists.
    pub async fn insert(&self, input: &NewProduct) -> DbResult<Product> {
        Self::insert_with(&self.pool, input).await
    }

    /// Executor-generic insert, usable inside a storage transaction.
    pub async fn insert_with<'e, E>(executor: E, input: &NewProduct) -> DbResult<Product>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        debug!(barcode = %input.barcode, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            barcode: input.barcode.trim().to_string(),
            name: input.name.trim().to_string(),
            category_id: input.category_id.clone(),
            stock_location_id: input.stock_location_id.clone(),
            quantity: input.quantity,
            cost_cents: input.cost_cents,
            price_cents: input.price_cents,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, barcode, name, category_id, stock_location_id,
                quantity, cost_cents, price_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.stock_location_id)
        .bind(product.quantity)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(executor)
        .await?;

        Ok(product)
    }

    /// Guarded conditional decrement, usable inside a storage transaction.
    ///
    /// Applies `quantity -= qty` only while `quantity >= qty` still holds.
    pub async fn try_decrement<'e, E>(executor: E, id: &str, qty: i64) -> DbResult<StockUpdate>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        debug!(id = %id, qty = %qty, "Conditional stock decrement");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - ?2, updated_at = ?3
            WHERE id = ?1 AND quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(qty)
        .bind(now)
        .execute(executor)
        .await?;

        if result.rows_affected() > 0 {
            Ok(StockUpdate::Applied)
        } else {
            Ok(StockUpdate::Insufficient)
        }
    }

    /// Guarded delta adjustment (positive or negative), usable inside a
    /// storage transaction.
    ///
    /// The guard `quantity + delta >= 0` keeps the stored count
    /// non-negative without a read-then-write window.
    pub async fn try_adjust<'e, E>(executor: E, id: &str, delta: i64) -> DbResult<StockUpdate>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        debug!(id = %id, delta = %delta, "Conditional stock adjustment");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1 AND quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(executor)
        .await?;

        if result.rows_affected() > 0 {
            Ok(StockUpdate::Applied)
        } else {
            Ok(StockUpdate::Insufficient)
        }
    }

    /// Updates an existing product row in full.
    ///
    /// Callers (the ledger) are responsible for invariant checks and for
    /// stamping `updated_at`; this is a plain row write, so what the
    /// caller holds is exactly what the row says.
    pub async fn update<'e, E>(executor: E, product: &Product) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                barcode = ?2,
                name = ?3,
                category_id = ?4,
                stock_location_id = ?5,
                quantity = ?6,
                cost_cents = ?7,
                price_cents = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.stock_location_id)
        .bind(product.quantity)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.updated_at)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Hard-deletes a product.
    ///
    /// Transaction line items referencing it keep their dangling
    /// product_id; the ledger is historical, not a live join.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        Self::delete_with(&self.pool, id).await
    }

    /// Executor-generic delete, usable inside a storage transaction.
    pub async fn delete_with<'e, E>(executor: E, id: &str) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
