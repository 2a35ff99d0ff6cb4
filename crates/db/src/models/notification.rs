//! Notification entity model and DTOs.

use intake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_profile_id: DbId,
    /// Client the notice is about, if any.
    pub client_id: Option<DbId>,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub recipient_profile_id: DbId,
    pub client_id: Option<DbId>,
    pub kind: String,
    pub message: String,
}
