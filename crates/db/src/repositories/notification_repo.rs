//! Repository for the `notifications` table.

use intake_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str =
    "id, recipient_profile_id, client_id, kind, message, is_read, read_at, created_at, updated_at";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a single notification, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (recipient_profile_id, client_id, kind, message)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.recipient_profile_id)
            .bind(input.client_id)
            .bind(&input.kind)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// Insert the same notice for every recipient in one statement.
    ///
    /// Returns the number of rows inserted.
    pub async fn create_for_recipients(
        pool: &PgPool,
        recipients: &[DbId],
        client_id: Option<DbId>,
        kind: &str,
        message: &str,
    ) -> Result<u64, sqlx::Error> {
        if recipients.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO notifications (recipient_profile_id, client_id, kind, message)
             SELECT recipient, $2, $3, $4 FROM UNNEST($1::BIGINT[]) AS recipient",
        )
        .bind(recipients)
        .bind(client_id)
        .bind(kind)
        .bind(message)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List notifications for a recipient, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_recipient(
        pool: &PgPool,
        profile_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE recipient_profile_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(profile_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification was found for the given recipient
    /// and updated, `false` otherwise.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        profile_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND recipient_profile_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(profile_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a recipient.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(pool: &PgPool, profile_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE recipient_profile_id = $1 AND is_read = false",
        )
        .bind(profile_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread notifications for a recipient.
    pub async fn unread_count(pool: &PgPool, profile_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_profile_id = $1 AND is_read = false",
        )
        .bind(profile_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Timestamp of the most recent notice of `kind` about a client.
    pub async fn latest_for_client(
        pool: &PgPool,
        client_id: DbId,
        kind: &str,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT MAX(created_at) FROM notifications WHERE client_id = $1 AND kind = $2",
        )
        .bind(client_id)
        .bind(kind)
        .fetch_one(pool)
        .await
    }
}
