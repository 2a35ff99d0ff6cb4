//! Client image uploads.
//!
//! An upload lands in the blob store first and is then recorded in
//! `form_images`; if the insert fails the blob is removed again.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use intake_core::error::CoreError;
use intake_core::image_catalog::{validate_upload, ImageKey};
use intake_core::types::DbId;
use intake_db::models::app_form::AppForm;
use intake_db::models::client::Client;
use intake_db::models::form_image::{CreateFormImage, FormImage};
use intake_db::repositories::{AppFormRepo, FormImageRepo};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::saga::{retry, Saga};
use crate::services::workflow::after_client_change;
use crate::state::AppState;

/// Attempts for best-effort blob removal.
pub const BLOB_REMOVE_ATTEMPTS: u32 = 3;
pub const BLOB_REMOVE_BACKOFF: Duration = Duration::from_millis(200);

/// A decoded multipart upload.
#[derive(Debug)]
pub struct Upload {
    pub key: ImageKey,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Blob key for a new upload: `forms/{form}/{app}/{store}/{type}/{uuid}.png`.
pub fn storage_path(form_id: DbId, key: &ImageKey) -> String {
    format!(
        "forms/{form_id}/{}/{}/{}/{}.png",
        key.app_type.as_str(),
        key.store_type.as_str(),
        key.image_type.as_str(),
        Uuid::new_v4()
    )
}

/// Validate, store and record an upload, then recompute progress.
pub async fn upload_image(
    state: &AppState,
    client: &Client,
    form: AppForm,
    upload: Upload,
) -> AppResult<(FormImage, AppForm)> {
    let pool = &state.pool;

    if upload.bytes.len() > state.config.max_upload_bytes {
        return Err(CoreError::Validation(format!(
            "Image exceeds the maximum size of {} bytes",
            state.config.max_upload_bytes
        ))
        .into());
    }

    let existing = FormImageRepo::count_for_key(pool, form.id, &upload.key).await?;
    let validated = validate_upload(&upload.key, &upload.bytes, existing.max(0) as usize)?;

    let path = storage_path(form.id, &upload.key);
    let mut saga = Saga::new("upload_image");

    saga.run("store_blob", state.blobs.put(&path, &upload.bytes)).await?;
    {
        let blobs = Arc::clone(&state.blobs);
        let path = path.clone();
        saga.on_rollback("store_blob", move || {
            async move { blobs.remove(&path).await.map_err(|e| e.to_string()) }.boxed()
        });
    }

    let input = CreateFormImage {
        form_id: form.id,
        key: upload.key,
        file_url: state.blobs.public_url(&path),
        storage_path: path,
        file_name: upload.file_name,
        dimensions: Some(validated.dimensions_label()),
        size_bytes: upload.bytes.len() as i64,
    };
    let image = saga
        .run("record_image", FormImageRepo::create(pool, &input))
        .await?;
    saga.commit();

    tracing::info!(
        client_id = client.id,
        form_id = form.id,
        image_id = image.id,
        category = %upload.key.category(),
        "Image uploaded"
    );

    let form = refresh_after_image_change(state, client, form).await?;
    Ok((image, form))
}

/// Delete one of the form's images and recompute progress.
///
/// The row goes first; a blob that cannot be removed is logged and left
/// behind.
pub async fn delete_image(
    state: &AppState,
    client: &Client,
    form: AppForm,
    image_id: DbId,
) -> AppResult<AppForm> {
    let image = FormImageRepo::delete_for_form(&state.pool, image_id, form.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "FormImage",
                id: image_id,
            })
        })?;

    let blobs = &state.blobs;
    let path = image.storage_path.as_str();
    if let Err(e) = retry(
        "remove_blob",
        BLOB_REMOVE_ATTEMPTS,
        BLOB_REMOVE_BACKOFF,
        move || blobs.remove(path),
    )
    .await
    {
        tracing::error!(error = %e, storage_path = path, "Image row deleted but blob remains");
    }

    tracing::info!(client_id = client.id, form_id = form.id, image_id, "Image deleted");
    refresh_after_image_change(state, client, form).await
}

async fn refresh_after_image_change(
    state: &AppState,
    client: &Client,
    form: AppForm,
) -> AppResult<AppForm> {
    let previous = form.progress_percentage;
    let touched = AppFormRepo::touch_activity(&state.pool, form.id, state.clock.now())
        .await?
        .unwrap_or(form);
    after_client_change(&state.pool, client, previous, touched).await
}
