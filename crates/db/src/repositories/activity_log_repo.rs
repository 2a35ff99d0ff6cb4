//! Repository for the `admin_activity_logs` table.

use intake_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity_log::{ActivityLog, CreateActivityLog};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, admin_profile_id, action_type, action_description, target_type, \
                       target_id, target_name, metadata, created_at, updated_at";

/// Provides append and read access to the administrator audit trail.
pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Append an entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateActivityLog,
    ) -> Result<ActivityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_activity_logs
                (admin_profile_id, action_type, action_description,
                 target_type, target_id, target_name, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(input.admin_profile_id)
            .bind(&input.action_type)
            .bind(&input.action_description)
            .bind(&input.target_type)
            .bind(input.target_id)
            .bind(&input.target_name)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// List entries newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM admin_activity_logs
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List entries about one target, newest first.
    pub async fn list_for_target(
        pool: &PgPool,
        target_type: &str,
        target_id: DbId,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM admin_activity_logs
             WHERE target_type = $1 AND target_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(target_type)
            .bind(target_id)
            .fetch_all(pool)
            .await
    }
}
