//! Repository for the `profiles` table.

use intake_core::roles::ROLE_ADMIN;
use intake_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, auth_user_id, email, name, role, created_at, updated_at";

/// Provides CRUD operations for profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (auth_user_id, email, name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.auth_user_id)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a profile by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the profile linked to an identity-service user.
    pub async fn find_by_auth_user_id(
        pool: &PgPool,
        auth_user_id: Uuid,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE auth_user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(auth_user_id)
            .fetch_optional(pool)
            .await
    }

    /// List administrator profiles, oldest first.
    pub async fn list_admins(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE role = $1 ORDER BY id");
        sqlx::query_as::<_, Profile>(&query)
            .bind(ROLE_ADMIN)
            .fetch_all(pool)
            .await
    }

    /// IDs of every administrator profile. Used for notification fan-out.
    pub async fn admin_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM profiles WHERE role = $1 ORDER BY id")
            .bind(ROLE_ADMIN)
            .fetch_all(pool)
            .await
    }

    /// Permanently delete a profile. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
