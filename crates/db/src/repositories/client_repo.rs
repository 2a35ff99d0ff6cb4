//! Repository for the `clients` table.

use intake_core::client::CLIENT_STATUS_ACTIVE;
use intake_core::roles::ROLE_CLIENT;
use intake_core::types::DbId;
use sqlx::PgPool;

use crate::models::app_form::AppForm;
use crate::models::client::{Client, ClientAccount, ClientSummary, CreateClientAccount};
use crate::models::profile::Profile;
use crate::repositories::app_form_repo::COLUMNS as FORM_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, profile_id, name, email, access_code, status, admin_notes, \
                       created_by, created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, auth_user_id, email, name, role, created_at, updated_at";

/// Provides CRUD operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert the profile, client and empty form for a new account in one
    /// transaction. Either all three rows exist afterwards or none do.
    pub async fn create_account(
        pool: &PgPool,
        input: &CreateClientAccount,
    ) -> Result<ClientAccount, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (auth_user_id, email, name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(input.auth_user_id)
        .bind(&input.email)
        .bind(&input.name)
        .bind(ROLE_CLIENT)
        .fetch_one(&mut *tx)
        .await?;

        let client = sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients (profile_id, name, email, access_code, status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(profile.id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.access_code)
        .bind(CLIENT_STATUS_ACTIVE)
        .bind(input.created_by)
        .fetch_one(&mut *tx)
        .await?;

        let form = sqlx::query_as::<_, AppForm>(&format!(
            "INSERT INTO app_forms (client_id, status, progress_percentage, last_activity_date)
             VALUES ($1, 'not_started', 0, NOW())
             RETURNING {FORM_COLUMNS}"
        ))
        .bind(client.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(
            profile_id = profile.id,
            client_id = client.id,
            form_id = form.id,
            "Client account rows inserted"
        );

        Ok(ClientAccount {
            profile,
            client,
            form,
        })
    }

    /// Whether an access code is already assigned.
    pub async fn access_code_taken(pool: &PgPool, access_code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE access_code = $1)")
            .bind(access_code)
            .fetch_one(pool)
            .await
    }

    /// Find a client by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the client owned by a profile.
    pub async fn find_by_profile_id(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE profile_id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(profile_id)
            .fetch_optional(pool)
            .await
    }

    /// List clients with their form headline, newest first.
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<ClientSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClientSummary>(
            "SELECT c.id, c.name, c.email, c.access_code, c.status, c.created_at,
                    f.id AS form_id, f.progress_percentage, f.status AS form_status,
                    f.review_status, f.corrections_completed, f.project_status,
                    f.last_activity_date
             FROM clients c
             LEFT JOIN app_forms f ON f.client_id = c.id
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Set a client's status. Returns `None` if the client does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Replace the administrator notes. `None` clears them.
    pub async fn update_notes(
        pool: &PgPool,
        id: DbId,
        admin_notes: Option<&str>,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET admin_notes = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(admin_notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a client's profile and, through cascades, the client, its form,
    /// image rows and notifications. Returns `true` if anything was removed.
    pub async fn delete_account(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let profile_id: Option<DbId> =
            sqlx::query_scalar("SELECT profile_id FROM clients WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(profile_id) = profile_id else {
            tracing::debug!(client_id = id, "No client row to delete");
            return Ok(false);
        };

        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(client_id = id, profile_id, "Client account rows deleted");
        Ok(true)
    }
}
