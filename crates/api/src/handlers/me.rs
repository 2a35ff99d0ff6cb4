//! Handlers for the caller's own client record and form (`/me`).
//!
//! Every endpoint requires the `client` role. A client whose account has
//! been deactivated gets 403 on all of them.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use intake_core::client::CLIENT_STATUS_INACTIVE;
use intake_core::error::CoreError;
use intake_core::image_catalog::{all_slots, ImageKey, REQUIRED_IMAGES};
use intake_core::types::DbId;
use intake_db::models::app_form::{AppForm, UpdateFormFields};
use intake_db::models::client::Client;
use intake_db::models::form_image::FormImage;
use intake_db::repositories::{AppFormRepo, ClientRepo, FormImageRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireClient;
use crate::response::DataResponse;
use crate::services::images::{self, Upload};
use crate::services::workflow;
use crate::state::AppState;

/// Resolve the caller's client row and form, refusing deactivated accounts.
async fn client_context(state: &AppState, user: &AuthUser) -> AppResult<(Client, AppForm)> {
    let client = ClientRepo::find_by_profile_id(&state.pool, user.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: user.profile_id,
            })
        })?;

    if client.status == CLIENT_STATUS_INACTIVE {
        return Err(AppError::Core(CoreError::Forbidden(
            "This account has been deactivated".into(),
        )));
    }

    let form = AppFormRepo::find_by_client_id(&state.pool, client.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Internal(format!(
                "Client {} has no form",
                client.id
            )))
        })?;

    Ok((client, form))
}

/// GET /api/v1/me/client
pub async fn get_client(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Client>>> {
    let (client, _) = client_context(&state, &user).await?;
    Ok(Json(DataResponse { data: client }))
}

/// GET /api/v1/me/form
pub async fn get_form(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    let (_, form) = client_context(&state, &user).await?;
    Ok(Json(DataResponse { data: form }))
}

/// PATCH /api/v1/me/form
///
/// Apply any subset of the editable fields. Progress and status are
/// recomputed from the stored row afterwards.
pub async fn update_form(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Json(patch): Json<UpdateFormFields>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    let (client, form) = client_context(&state, &user).await?;
    let form = workflow::apply_client_edit(&state, &client, form, &patch).await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/me/form/corrections-complete
///
/// Only allowed while the form is rejected; 409 otherwise.
pub async fn complete_corrections(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    let (client, form) = client_context(&state, &user).await?;
    let form = workflow::complete_corrections(&state, &client, form).await?;
    Ok(Json(DataResponse { data: form }))
}

/* --------------------------------------------------------------------------
Images
-------------------------------------------------------------------------- */

/// GET /api/v1/me/form/images
pub async fn list_images(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<FormImage>>>> {
    let (_, form) = client_context(&state, &user).await?;
    let images = FormImageRepo::list_by_form(&state.pool, form.id).await?;
    Ok(Json(DataResponse { data: images }))
}

/// Result of an upload: the new image and the recomputed form.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub image: FormImage,
    pub form: AppForm,
}

/// POST /api/v1/me/form/images
///
/// Multipart fields: `app_type`, `store_type`, `image_type` and `file`.
pub async fn upload_image(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadResponse>>)> {
    let (client, form) = client_context(&state, &user).await?;

    let mut app_type: Option<String> = None;
    let mut store_type: Option<String> = None;
    let mut image_type: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.png").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((file_name, data.to_vec()));
            }
            "app_type" | "store_type" | "image_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "app_type" => app_type = Some(text),
                    "store_type" => store_type = Some(text),
                    _ => image_type = Some(text),
                }
            }
            _ => {}
        }
    }

    let missing = |field: &str| AppError::BadRequest(format!("Missing required '{field}' field"));
    let key = ImageKey::parse(
        app_type.as_deref().ok_or_else(|| missing("app_type"))?.trim(),
        store_type.as_deref().ok_or_else(|| missing("store_type"))?.trim(),
        image_type.as_deref().ok_or_else(|| missing("image_type"))?.trim(),
    )?;
    let (file_name, bytes) = file.ok_or_else(|| missing("file"))?;

    let upload = Upload {
        key,
        file_name,
        bytes,
    };
    let (image, form) = images::upload_image(&state, &client, form, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse { image, form },
        }),
    ))
}

/// DELETE /api/v1/me/form/images/{id}
pub async fn delete_image(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Path(image_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (client, form) = client_context(&state, &user).await?;
    images::delete_image(&state, &client, form, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// One row of the slot table.
#[derive(Debug, Serialize)]
pub struct ImageSlot {
    #[serde(flatten)]
    pub key: ImageKey,
    pub category: String,
    /// Accepted sizes as `"WxH"`.
    pub dimensions: Vec<String>,
    pub max_count: usize,
    pub min_count: usize,
    /// Counts toward the custom-image progress unit.
    pub required: bool,
    pub uploaded: usize,
}

/// GET /api/v1/me/form/image-slots
pub async fn image_slots(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ImageSlot>>>> {
    let (_, form) = client_context(&state, &user).await?;

    let mut counts: HashMap<ImageKey, usize> = HashMap::new();
    for key in workflow::uploaded_keys(&state.pool, form.id).await? {
        *counts.entry(key).or_default() += 1;
    }

    let slots = all_slots()
        .into_iter()
        .map(|(key, rule)| ImageSlot {
            category: key.category(),
            dimensions: rule
                .dimensions
                .iter()
                .map(|(w, h)| format!("{w}x{h}"))
                .collect(),
            max_count: rule.max_count,
            min_count: rule.min_count,
            required: REQUIRED_IMAGES.contains(&key),
            uploaded: counts.get(&key).copied().unwrap_or(0),
            key,
        })
        .collect();

    Ok(Json(DataResponse { data: slots }))
}
