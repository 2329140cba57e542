//! # Activity Log Repository
//!
//! Append-only audit sink. Every product create/update/delete appends one
//! entry `{actor_id, action, description}`; nothing here is ever updated.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use depot_core::ActivityEntry;

/// Repository for the activity log.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Appends one entry.
    pub async fn append(
        &self,
        actor_id: &str,
        action: &str,
        description: &str,
    ) -> DbResult<ActivityEntry> {
        Self::append_with(&self.pool, actor_id, action, description).await
    }

    /// Executor-generic append, usable inside a storage transaction.
    pub async fn append_with<'e, E>(
        executor: E,
        actor_id: &str,
        action: &str,
        description: &str,
    ) -> DbResult<ActivityEntry>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            actor_id: actor_id.to_string(),
            action: action.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };

        debug!(actor = %entry.actor_id, action = %entry.action, "Appending activity entry");

        sqlx::query(
            r#"
            INSERT INTO activity_log (id, actor_id, action, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.description)
        .bind(entry.created_at)
        .execute(executor)
        .await?;

        Ok(entry)
    }

    /// Lists entries, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT id, actor_id, action, description, created_at
            FROM activity_log
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
