//! Handlers for the `/admin/clients` resource.
//!
//! All endpoints require the `admin` role. Every mutation writes an
//! activity-log entry.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use intake_core::client::ClientStatus;
use intake_core::error::CoreError;
use intake_core::types::DbId;
use intake_db::models::app_form::AppForm;
use intake_db::models::client::{Client, ClientSummary, UpdateClientNotes, UpdateClientStatus};
use intake_db::repositories::{AppFormRepo, ClientRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::services::accounts::{self, CreateClientRequest, CreatedClient, DeletionReport};
use crate::services::activity::{
    self, Activity, ACTION_CLIENT_EXPORTED, ACTION_CLIENT_NOTES_UPDATED,
    ACTION_CLIENT_STATUS_CHANGED, TARGET_CLIENT,
};
use crate::services::export;
use crate::state::AppState;

/// Longest accepted administrator note.
const MAX_NOTES_LENGTH: usize = 10_000;

fn client_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Client",
        id,
    })
}

/// GET /api/v1/admin/clients
pub async fn list_clients(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ClientSummary>>>> {
    let clients = ClientRepo::list_summaries(&state.pool).await?;
    Ok(Json(DataResponse { data: clients }))
}

/// POST /api/v1/admin/clients
///
/// Provision the identity, profile, client and empty form. The response
/// carries the generated access code.
pub async fn create_client(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateClientRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedClient>>)> {
    let created = accounts::create_client(&state, &admin, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// A client together with its form.
#[derive(Debug, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub form: Option<AppForm>,
}

/// GET /api/v1/admin/clients/{id}
pub async fn get_client(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClientDetail>>> {
    let client = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| client_not_found(id))?;
    let form = AppFormRepo::find_by_client_id(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ClientDetail { client, form },
    }))
}

/// DELETE /api/v1/admin/clients/{id}
///
/// Returns the deletion report; `residue` lists anything that could not be
/// cleaned up outside the database.
pub async fn delete_client(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeletionReport>>> {
    let report = accounts::delete_client(&state, &admin, id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// PUT /api/v1/admin/clients/{id}/status
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClientStatus>,
) -> AppResult<Json<DataResponse<Client>>> {
    let status = ClientStatus::from_str_value(input.status.trim())?;
    let previous = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| client_not_found(id))?;

    let client = ClientRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| client_not_found(id))?;

    tracing::info!(client_id = id, status = status.as_str(), "Client status updated");

    activity::record(
        &state.pool,
        &admin,
        Activity {
            action_type: ACTION_CLIENT_STATUS_CHANGED,
            description: format!("Set {} to {}", client.name, client.status),
            target: Some((TARGET_CLIENT, client.id, &client.name)),
            metadata: Some(serde_json::json!({
                "from": previous.status,
                "to": client.status,
            })),
        },
    )
    .await;

    Ok(Json(DataResponse { data: client }))
}

/// PUT /api/v1/admin/clients/{id}/notes
///
/// Blank notes clear the field.
pub async fn update_notes(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClientNotes>,
) -> AppResult<Json<DataResponse<Client>>> {
    let notes = input
        .admin_notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    if notes.is_some_and(|n| n.chars().count() > MAX_NOTES_LENGTH) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Notes must be at most {MAX_NOTES_LENGTH} characters"
        ))));
    }

    let client = ClientRepo::update_notes(&state.pool, id, notes)
        .await?
        .ok_or_else(|| client_not_found(id))?;

    activity::record(
        &state.pool,
        &admin,
        Activity {
            action_type: ACTION_CLIENT_NOTES_UPDATED,
            description: format!("Updated notes for {}", client.name),
            target: Some((TARGET_CLIENT, client.id, &client.name)),
            metadata: None,
        },
    )
    .await;

    Ok(Json(DataResponse { data: client }))
}

/// GET /api/v1/admin/clients/{id}/export
///
/// Download the client's form text and images as a zip archive.
pub async fn export_client(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let export = export::export_client(&state, id).await?;

    activity::record(
        &state.pool,
        &admin,
        Activity {
            action_type: ACTION_CLIENT_EXPORTED,
            description: format!("Exported the form of {}", export.client.name),
            target: Some((TARGET_CLIENT, export.client.id, &export.client.name)),
            metadata: Some(serde_json::json!({
                "size_bytes": export.bytes.len(),
                "skipped": export.skipped,
            })),
        },
    )
    .await;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.bytes,
    ))
}
