//! Administrator activity log model and DTOs.

use intake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `admin_activity_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub admin_profile_id: Option<DbId>,
    pub action_type: String,
    pub action_description: String,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub target_name: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an administrator action.
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub admin_profile_id: DbId,
    pub action_type: String,
    pub action_description: String,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub target_name: Option<String>,
    /// Defaults to `{}` when `None`.
    pub metadata: Option<serde_json::Value>,
}
