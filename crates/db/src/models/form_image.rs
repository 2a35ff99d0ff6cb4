//! Uploaded form image model and DTOs.

use intake_core::error::CoreError;
use intake_core::image_catalog::ImageKey;
use intake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `form_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormImage {
    pub id: DbId,
    pub form_id: DbId,
    pub app_type: String,
    pub store_type: String,
    pub image_type: String,
    /// Key inside the blob store.
    pub storage_path: String,
    pub file_url: String,
    pub file_name: String,
    /// `"WxH"` as read from the image header.
    pub dimensions: Option<String>,
    pub size_bytes: i64,
    pub uploaded_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FormImage {
    /// Parse the stored key columns.
    pub fn key(&self) -> Result<ImageKey, CoreError> {
        ImageKey::parse(&self.app_type, &self.store_type, &self.image_type)
    }
}

/// DTO for recording an upload that already landed in the blob store.
#[derive(Debug, Clone)]
pub struct CreateFormImage {
    pub form_id: DbId,
    pub key: ImageKey,
    pub storage_path: String,
    pub file_url: String,
    pub file_name: String,
    pub dimensions: Option<String>,
    pub size_bytes: i64,
}

/// Per-form upload fingerprint used by the completeness poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct UploadSignature {
    pub form_id: DbId,
    pub image_count: i64,
    pub max_image_id: Option<DbId>,
}
