//! Client entity model and DTOs.

use intake_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::app_form::AppForm;
use crate::models::profile::Profile;

/// A row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub profile_id: DbId,
    pub name: String,
    pub email: String,
    pub access_code: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client row joined with the headline fields of its form.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientSummary {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub access_code: String,
    pub status: String,
    pub created_at: Timestamp,
    pub form_id: Option<DbId>,
    pub progress_percentage: Option<i32>,
    pub form_status: Option<String>,
    pub review_status: Option<String>,
    pub corrections_completed: Option<bool>,
    pub project_status: Option<String>,
    pub last_activity_date: Option<Timestamp>,
}

/// Everything inserted when a client account is provisioned.
#[derive(Debug, Clone)]
pub struct CreateClientAccount {
    pub auth_user_id: Uuid,
    pub name: String,
    pub email: String,
    pub access_code: String,
    /// Administrator profile that created the account.
    pub created_by: Option<DbId>,
}

/// The three rows written by [`ClientRepo::create_account`](crate::repositories::ClientRepo::create_account).
#[derive(Debug, Clone, Serialize)]
pub struct ClientAccount {
    pub profile: Profile,
    pub client: Client,
    pub form: AppForm,
}

/// DTO for an administrator toggling a client's status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClientStatus {
    pub status: String,
}

/// DTO for an administrator editing private notes.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClientNotes {
    pub admin_notes: Option<String>,
}
