//! Administrator activity log.
//!
//! Writing the log never fails the request that triggered it; the mutation
//! has already happened by the time the entry is written.

use intake_core::types::DbId;
use intake_db::models::activity_log::CreateActivityLog;
use intake_db::repositories::ActivityLogRepo;
use sqlx::PgPool;

use crate::middleware::auth::AuthUser;

pub const ACTION_CLIENT_CREATED: &str = "client_created";
pub const ACTION_CLIENT_DELETED: &str = "client_deleted";
pub const ACTION_CLIENT_STATUS_CHANGED: &str = "client_status_changed";
pub const ACTION_CLIENT_NOTES_UPDATED: &str = "client_notes_updated";
pub const ACTION_CLIENT_EXPORTED: &str = "client_exported";
pub const ACTION_FORM_APPROVED: &str = "form_approved";
pub const ACTION_FORM_REJECTED: &str = "form_rejected";
pub const ACTION_MEETING_UPDATED: &str = "meeting_updated";
pub const ACTION_PROJECT_STATUS_CHANGED: &str = "project_status_changed";
pub const ACTION_PROGRESS_RECALCULATED: &str = "progress_recalculated";
pub const ACTION_ADMIN_CREATED: &str = "admin_created";
pub const ACTION_INACTIVITY_SCAN: &str = "inactivity_scan";

pub const TARGET_CLIENT: &str = "client";
pub const TARGET_FORM: &str = "form";
pub const TARGET_PROFILE: &str = "profile";

/// What an administrator did, and to what.
pub struct Activity<'a> {
    pub action_type: &'static str,
    pub description: String,
    pub target: Option<(&'static str, DbId, &'a str)>,
    pub metadata: Option<serde_json::Value>,
}

/// Record an administrator action. Failures are logged and swallowed.
pub async fn record(pool: &PgPool, admin: &AuthUser, activity: Activity<'_>) {
    let (target_type, target_id, target_name) = match activity.target {
        Some((kind, id, name)) => (Some(kind.to_string()), Some(id), Some(name.to_string())),
        None => (None, None, None),
    };

    let input = CreateActivityLog {
        admin_profile_id: admin.profile_id,
        action_type: activity.action_type.to_string(),
        action_description: activity.description,
        target_type,
        target_id,
        target_name,
        metadata: activity.metadata,
    };

    if let Err(e) = ActivityLogRepo::create(pool, &input).await {
        tracing::error!(
            error = %e,
            admin_profile_id = admin.profile_id,
            action_type = activity.action_type,
            "Failed to write activity log"
        );
    }
}
