//! Repository for the `form_images` table.

use intake_core::form::IMAGE_SOURCE_CUSTOM;
use intake_core::image_catalog::ImageKey;
use intake_core::types::DbId;
use sqlx::PgPool;

use crate::models::form_image::{CreateFormImage, FormImage, UploadSignature};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, form_id, app_type, store_type, image_type, storage_path, file_url, \
                       file_name, dimensions, size_bytes, uploaded_at, created_at, updated_at";

/// Provides CRUD operations for form images.
pub struct FormImageRepo;

impl FormImageRepo {
    /// Record an uploaded image, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFormImage) -> Result<FormImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_images
                (form_id, app_type, store_type, image_type, storage_path, file_url,
                 file_name, dimensions, size_bytes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormImage>(&query)
            .bind(input.form_id)
            .bind(input.key.app_type.as_str())
            .bind(input.key.store_type.as_str())
            .bind(input.key.image_type.as_str())
            .bind(&input.storage_path)
            .bind(&input.file_url)
            .bind(&input.file_name)
            .bind(&input.dimensions)
            .bind(input.size_bytes)
            .fetch_one(pool)
            .await
    }

    /// Find an image by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_images WHERE id = $1");
        sqlx::query_as::<_, FormImage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a form's images grouped by key, oldest first within a key.
    pub async fn list_by_form(pool: &PgPool, form_id: DbId) -> Result<Vec<FormImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_images
             WHERE form_id = $1
             ORDER BY app_type, store_type, image_type, uploaded_at, id"
        );
        sqlx::query_as::<_, FormImage>(&query)
            .bind(form_id)
            .fetch_all(pool)
            .await
    }

    /// Number of images stored under one key.
    pub async fn count_for_key(
        pool: &PgPool,
        form_id: DbId,
        key: &ImageKey,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM form_images
             WHERE form_id = $1 AND app_type = $2 AND store_type = $3 AND image_type = $4",
        )
        .bind(form_id)
        .bind(key.app_type.as_str())
        .bind(key.store_type.as_str())
        .bind(key.image_type.as_str())
        .fetch_one(pool)
        .await
    }

    /// Distinct `(app_type, store_type, image_type)` triples present on a form.
    pub async fn keys_for_form(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<(String, String, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT DISTINCT app_type, store_type, image_type
             FROM form_images WHERE form_id = $1",
        )
        .bind(form_id)
        .fetch_all(pool)
        .await
    }

    /// Storage paths of every image belonging to a client's form.
    pub async fn storage_paths_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT i.storage_path FROM form_images i
             JOIN app_forms f ON f.id = i.form_id
             WHERE f.client_id = $1
             ORDER BY i.id",
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    /// Upload fingerprints for every custom-source form, including forms
    /// with no images.
    pub async fn custom_source_signatures(
        pool: &PgPool,
    ) -> Result<Vec<UploadSignature>, sqlx::Error> {
        sqlx::query_as::<_, UploadSignature>(
            "SELECT f.id AS form_id, COUNT(i.id) AS image_count, MAX(i.id) AS max_image_id
             FROM app_forms f
             LEFT JOIN form_images i ON i.form_id = f.id
             WHERE f.image_source = $1
             GROUP BY f.id
             ORDER BY f.id",
        )
        .bind(IMAGE_SOURCE_CUSTOM)
        .fetch_all(pool)
        .await
    }

    /// Delete an image row scoped to its form, returning the removed row.
    pub async fn delete_for_form(
        pool: &PgPool,
        id: DbId,
        form_id: DbId,
    ) -> Result<Option<FormImage>, sqlx::Error> {
        let query = format!(
            "DELETE FROM form_images WHERE id = $1 AND form_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormImage>(&query)
            .bind(id)
            .bind(form_id)
            .fetch_optional(pool)
            .await
    }
}
