//! # Transaction Repository
//!
//! Database operations for the immutable sale ledger.
//!
//! ## Immutability
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Transactions are an append-only historical record:                     │
//! │                                                                         │
//! │  • insert() / insert_item() - called by the stock ledger, inside the    │
//! │    same storage transaction as the quantity decrement                   │
//! │  • list() / get_with_items() - read-only consumption                    │
//! │                                                                         │
//! │  There is NO update path. Line items keep a bare product_id that may    │
//! │  dangle after product deletion - resolved by a lookup that may fail.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use depot_core::{Transaction, TransactionItem, TransactionWithItems};

/// Repository for sale transaction operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Inserts a transaction row, usable inside a storage transaction.
    ///
    /// The ledger computes the totals from the line items before calling
    /// this; caller-supplied aggregates are never trusted.
    pub async fn insert<'e, E>(executor: E, txn: &Transaction) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        debug!(id = %txn.id, profit = %txn.profit_cents, "Inserting transaction");

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, total_price_cents, total_cost_cents, profit_cents,
                user_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&txn.id)
        .bind(txn.total_price_cents)
        .bind(txn.total_cost_cents)
        .bind(txn.profit_cents)
        .bind(&txn.user_id)
        .bind(txn.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Inserts a line item, usable inside a storage transaction.
    pub async fn insert_item<'e, E>(executor: E, item: &TransactionItem) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO transaction_items (
                id, transaction_id, product_id, quantity, price_cents, cost_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.transaction_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let txn = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, total_price_cents, total_cost_cents, profit_cents,
                   user_id, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(txn)
    }

    /// Gets a transaction together with its ordered line items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<TransactionWithItems>> {
        let Some(transaction) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        Ok(Some(TransactionWithItems { transaction, items }))
    }

    /// Gets the line items for a transaction, in insertion order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, quantity, price_cents, cost_cents
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Bulk listing, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Transaction>> {
        let txns = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, total_price_cents, total_cost_cents, profit_cents,
                   user_id, created_at
            FROM transactions
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(txns)
    }

    /// All line items that reference a product, newest transaction first.
    ///
    /// Works for deleted products too; the reference is historical.
    pub async fn list_items_for_product(&self, product_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT ti.id, ti.transaction_id, ti.product_id, ti.quantity,
                   ti.price_cents, ti.cost_cents
            FROM transaction_items ti
            INNER JOIN transactions t ON t.id = ti.transaction_id
            WHERE ti.product_id = ?1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts transactions (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new transaction ID.
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new line item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}
