//! # Notification Repository
//!
//! The notification store: persistence and read-state for user
//! notifications.
//!
//! ## Scoping Rule
//! Every list/stat/mutation query here is scoped by `user_id` (except the
//! explicitly unscoped [`stats_all`]). No cross-user leakage: a mark-read
//! or delete with a foreign id is a no-op, not an error leak.
//!
//! [`stats_all`]: NotificationRepository::stats_all

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use depot_core::{NewNotification, Notification, NotificationKind, NotificationStats};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, kind, category, \
     read, action_url, metadata, created_at";

/// Options for listing a user's notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Only unread notifications.
    pub unread_only: bool,
    /// Maximum rows to return; `None` means no limit.
    pub limit: Option<u32>,
    /// Rows to skip (pagination).
    pub skip: u32,
}

/// Repository for the notification store.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Inserts one notification and returns it.
    pub async fn insert(&self, input: &NewNotification) -> DbResult<Notification> {
        Self::insert_with(&self.pool, input).await
    }

    /// Executor-generic insert, usable inside a storage transaction.
    pub async fn insert_with<'e, E>(executor: E, input: &NewNotification) -> DbResult<Notification>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let metadata = match &input.metadata {
            Some(value) => Some(
                serde_json::to_string(value)
                    .map_err(|e| DbError::Internal(format!("metadata serialization: {e}")))?,
            ),
            None => None,
        };

        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id.clone(),
            title: input.title.clone(),
            message: input.message.clone(),
            kind: input.kind,
            category: input.category,
            read: false,
            action_url: input.action_url.clone(),
            metadata,
            created_at: Utc::now(),
        };

        debug!(user_id = %notification.user_id, title = %notification.title, "Inserting notification");

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, title, message, kind, category,
                read, action_url, metadata, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind)
        .bind(notification.category)
        .bind(notification.read)
        .bind(&notification.action_url)
        .bind(&notification.metadata)
        .bind(notification.created_at)
        .execute(executor)
        .await?;

        Ok(notification)
    }

    /// Bulk insert as a single unit of work.
    ///
    /// All rows are written inside one storage transaction: either the
    /// whole batch lands or none of it does.
    pub async fn insert_many(&self, inputs: &[NewNotification]) -> DbResult<Vec<Notification>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(inputs.len());

        for input in inputs {
            let notification = Self::insert_with(&mut *tx, input).await?;
            inserted.push(notification);
        }

        tx.commit().await?;
        debug!(count = inserted.len(), "Bulk-inserted notifications");

        Ok(inserted)
    }

    /// Lists a user's notifications, newest first.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        options: ListOptions,
    ) -> DbResult<Vec<Notification>> {
        // SQLite treats LIMIT -1 as "no limit"
        let limit: i64 = options.limit.map_or(-1, i64::from);

        let sql = if options.unread_only {
            format!(
                "SELECT {} FROM notifications WHERE user_id = ?1 AND read = 0 \
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                NOTIFICATION_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM notifications WHERE user_id = ?1 \
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                NOTIFICATION_COLUMNS
            )
        };

        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(options.skip)
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    /// The alert dedup-window query: a user's inventory warnings with the
    /// given title created at or after `since`.
    pub async fn list_recent_inventory_warnings(
        &self,
        user_id: &str,
        title: &str,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {} FROM notifications \
             WHERE user_id = ?1 AND category = 'inventory' AND kind = 'warning' \
               AND title = ?2 AND created_at >= ?3 \
             ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        );

        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(title)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    /// Marks one notification read. Returns the number of rows affected
    /// (0 when the id doesn't exist or belongs to another user).
    pub async fn mark_read(&self, id: &str, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Marks a batch of notifications read, scoped to the user.
    pub async fn mark_many_read(&self, ids: &[String], user_id: &str) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0u64;

        for id in ids {
            let result =
                sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?1 AND user_id = ?2")
                    .bind(id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }

    /// Marks all of a user's notifications read.
    pub async fn mark_all_read(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Hard-deletes one notification, scoped to the user.
    pub async fn delete(&self, id: &str, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Hard-deletes a batch, scoped to the user.
    pub async fn delete_many(&self, ids: &[String], user_id: &str) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0u64;

        for id in ids {
            let result = sqlx::query("DELETE FROM notifications WHERE id = ?1 AND user_id = ?2")
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }

    /// Hard-deletes everything belonging to a user.
    pub async fn delete_all_for_user(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Per-user aggregate stats: total, unread, read, and a by-kind
    /// breakdown.
    pub async fn stats(&self, user_id: &str) -> DbResult<NotificationStats> {
        let (total, unread): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(CASE WHEN read = 0 THEN 1 ELSE 0 END), 0)
            FROM notifications
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let by_kind: Vec<(NotificationKind, i64)> = sqlx::query_as(
            "SELECT kind, COUNT(*) FROM notifications WHERE user_id = ?1 GROUP BY kind",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(build_stats(total, unread, by_kind))
    }

    /// Aggregate stats across all users (admin diagnostics).
    pub async fn stats_all(&self) -> DbResult<NotificationStats> {
        let (total, unread): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(CASE WHEN read = 0 THEN 1 ELSE 0 END), 0)
            FROM notifications
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let by_kind: Vec<(NotificationKind, i64)> =
            sqlx::query_as("SELECT kind, COUNT(*) FROM notifications GROUP BY kind")
                .fetch_all(&self.pool)
                .await?;

        Ok(build_stats(total, unread, by_kind))
    }
}

fn build_stats(total: i64, unread: i64, by_kind: Vec<(NotificationKind, i64)>) -> NotificationStats {
    let mut stats = NotificationStats {
        total,
        unread,
        read: total - unread,
        by_kind: Default::default(),
    };
    for (kind, count) in by_kind {
        stats.by_kind.insert(kind.as_str().to_string(), count);
    }
    stats
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use depot_core::NotificationCategory;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn plain(user_id: &str, title: &str) -> NewNotification {
        NewNotification {
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: format!("{title} body"),
            kind: NotificationKind::Info,
            category: NotificationCategory::System,
            action_url: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let db = test_db().await;
        let repo = db.notifications();

        repo.insert(&plain("u1", "first")).await.unwrap();
        repo.insert(&plain("u1", "second")).await.unwrap();

        let all = repo.list_by_user("u1", ListOptions::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|n| !n.read));
    }

    #[tokio::test]
    async fn test_listing_is_scoped_by_user() {
        let db = test_db().await;
        let repo = db.notifications();

        repo.insert(&plain("u1", "mine")).await.unwrap();
        repo.insert(&plain("u2", "theirs")).await.unwrap();

        let mine = repo.list_by_user("u1", ListOptions::default()).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }

    #[tokio::test]
    async fn test_unread_filter_and_pagination() {
        let db = test_db().await;
        let repo = db.notifications();

        let first = repo.insert(&plain("u1", "a")).await.unwrap();
        repo.insert(&plain("u1", "b")).await.unwrap();
        repo.insert(&plain("u1", "c")).await.unwrap();

        repo.mark_read(&first.id, "u1").await.unwrap();

        let unread = repo
            .list_by_user(
                "u1",
                ListOptions {
                    unread_only: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unread.len(), 2);

        let page = repo
            .list_by_user(
                "u1",
                ListOptions {
                    limit: Some(2),
                    skip: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_read_ignores_foreign_ids() {
        let db = test_db().await;
        let repo = db.notifications();
        let n = repo.insert(&plain("u1", "mine")).await.unwrap();

        // Wrong user: no-op, not an error.
        assert_eq!(repo.mark_read(&n.id, "u2").await.unwrap(), 0);
        assert_eq!(repo.mark_read(&n.id, "u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_mutations_skip_foreign_ids() {
        let db = test_db().await;
        let repo = db.notifications();

        let mine = repo.insert(&plain("u1", "mine")).await.unwrap();
        let theirs = repo.insert(&plain("u2", "theirs")).await.unwrap();
        let ids = vec![mine.id.clone(), theirs.id.clone()];

        // Both batches carry a foreign id; only the caller's row is touched.
        assert_eq!(repo.mark_many_read(&ids, "u1").await.unwrap(), 1);
        assert_eq!(repo.delete_many(&ids, "u1").await.unwrap(), 1);

        let remaining = repo.list_by_user("u2", ListOptions::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, theirs.id);
        assert!(!remaining[0].read);
    }

    #[tokio::test]
    async fn test_stats_all_aggregates_across_users() {
        let db = test_db().await;
        let repo = db.notifications();

        let mut warn = plain("u1", "warn");
        warn.kind = NotificationKind::Warning;
        repo.insert(&warn).await.unwrap();
        let read_one = repo.insert(&plain("u1", "info")).await.unwrap();
        repo.insert(&plain("u2", "other")).await.unwrap();

        repo.mark_read(&read_one.id, "u1").await.unwrap();

        let all = repo.stats_all().await.unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.unread, 2);
        assert_eq!(all.read, 1);
        assert_eq!(all.by_kind.get("warning"), Some(&1));
        assert_eq!(all.by_kind.get("info"), Some(&2));

        // The scoped variant stays scoped.
        assert_eq!(repo.stats("u2").await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_mark_all_and_delete_all() {
        let db = test_db().await;
        let repo = db.notifications();

        for title in ["a", "b", "c"] {
            repo.insert(&plain("u1", title)).await.unwrap();
        }
        repo.insert(&plain("u2", "other")).await.unwrap();

        assert_eq!(repo.mark_all_read("u1").await.unwrap(), 3);
        assert_eq!(repo.delete_all_for_user("u1").await.unwrap(), 3);

        // u2 untouched.
        let stats = repo.stats("u2").await.unwrap();
        assert_eq!(stats.total, 1);
    }

    #[tokio::test]
    async fn test_stats_breakdown() {
        let db = test_db().await;
        let repo = db.notifications();

        let mut warn = plain("u1", "warn");
        warn.kind = NotificationKind::Warning;
        repo.insert(&warn).await.unwrap();

        let read_one = repo.insert(&plain("u1", "info")).await.unwrap();
        repo.mark_read(&read_one.id, "u1").await.unwrap();

        let stats = repo.stats("u1").await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.unread, 1);
        assert_eq!(stats.read, 1);
        assert_eq!(stats.by_kind.get("warning"), Some(&1));
        assert_eq!(stats.by_kind.get("info"), Some(&1));
    }

    #[tokio::test]
    async fn test_metadata_round_trips_as_json() {
        let db = test_db().await;
        let repo = db.notifications();

        let mut input = plain("u1", "with meta");
        input.metadata = Some(serde_json::json!({"productId": "p1", "currentStock": 3}));
        let n = repo.insert(&input).await.unwrap();

        let listed = repo.list_by_user("u1", ListOptions::default()).await.unwrap();
        assert_eq!(listed[0].id, n.id);

        let meta = listed[0].metadata_value().unwrap();
        assert_eq!(meta["productId"], "p1");
        assert_eq!(meta["currentStock"], 3);
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing_shape() {
        let db = test_db().await;
        let repo = db.notifications();

        let batch: Vec<NewNotification> =
            ["a", "b", "c"].iter().map(|t| plain("u1", t)).collect();
        let inserted = repo.insert_many(&batch).await.unwrap();
        assert_eq!(inserted.len(), 3);

        // Empty batch writes nothing and succeeds.
        assert!(repo.insert_many(&[]).await.unwrap().is_empty());
    }
}
