//! # Stock Location Repository
//!
//! Database operations for storage locations. A location's current stock is
//! always derived by summing the quantities of the products referencing it -
//! it is never stored, so it can never drift.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use depot_core::StockLocation;

/// Repository for stock location operations.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    /// Creates a new LocationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository { pool }
    }

    /// Gets a location by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockLocation>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Executor-generic fetch, usable inside a storage transaction.
    pub async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<StockLocation>>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let location = sqlx::query_as::<_, StockLocation>(
            "SELECT id, name, position, capacity, created_at FROM stock_locations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(location)
    }

    /// Lists all locations ordered by name.
    pub async fn list(&self) -> DbResult<Vec<StockLocation>> {
        let locations = sqlx::query_as::<_, StockLocation>(
            "SELECT id, name, position, capacity, created_at FROM stock_locations ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Inserts a new location and returns it.
    pub async fn insert(&self, name: &str, position: &str, capacity: i64) -> DbResult<StockLocation> {
        debug!(name = %name, capacity = %capacity, "Inserting stock location");

        let location = StockLocation {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            position: position.trim().to_string(),
            capacity,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO stock_locations (id, name, position, capacity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&location.id)
        .bind(&location.name)
        .bind(&location.position)
        .bind(location.capacity)
        .bind(location.created_at)
        .execute(&self.pool)
        .await?;

        Ok(location)
    }

    /// Derived current stock: SUM of quantity over products assigned to
    /// the location. Zero when nothing references it.
    pub async fn current_stock(&self, location_id: &str) -> DbResult<i64> {
        Self::fetch_current_stock(&self.pool, location_id).await
    }

    /// Executor-generic derived-stock query, usable inside a storage
    /// transaction (the ledger's capacity check runs it there).
    pub async fn fetch_current_stock<'e, E>(executor: E, location_id: &str) -> DbResult<i64>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(quantity) FROM products WHERE stock_location_id = ?1",
        )
        .bind(location_id)
        .fetch_one(executor)
        .await?;

        Ok(total.unwrap_or(0))
    }

    /// Deletes a location. Products referencing it keep their (now
    /// dangling) reference; no cascading delete is performed.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM stock_locations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockLocation", id));
        }

        Ok(())
    }
}
