//! Profile entity model and DTOs.

use intake_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    /// Identity-service user this profile belongs to.
    pub auth_user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub auth_user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}
