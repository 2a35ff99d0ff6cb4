//! Handlers for the `/admin/forms` resource: review decisions and the
//! project pipeline.

use axum::extract::{Path, State};
use axum::Json;
use intake_core::error::CoreError;
use intake_core::form::ProjectStatus;
use intake_core::types::DbId;
use intake_db::models::app_form::{AppForm, UpdateMeeting, UpdateProjectStatus};
use intake_db::models::form_image::FormImage;
use intake_db::repositories::{AppFormRepo, ClientRepo, FormImageRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::services::activity::{
    self, Activity, ACTION_MEETING_UPDATED, ACTION_PROJECT_STATUS_CHANGED, TARGET_FORM,
};
use crate::services::workflow::{self, ReviewDecision, ReviewRequest};
use crate::state::AppState;

/// GET /api/v1/admin/forms/{id}
pub async fn get_form(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    let form = workflow::find_form(&state.pool, id).await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/admin/forms/{id}/images
pub async fn list_images(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FormImage>>>> {
    let form = workflow::find_form(&state.pool, id).await?;
    let images = FormImageRepo::list_by_form(&state.pool, form.id).await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/v1/admin/forms/{id}/approve
///
/// Feedback is optional. A form at 95% or more is promoted to 100%.
pub async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ReviewRequest>>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    let Json(input) = body.unwrap_or_default();
    let form = workflow::review_form(
        &state,
        &admin,
        id,
        ReviewDecision::Approve,
        input.feedback.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/admin/forms/{id}/reject
///
/// Requires non-blank feedback.
pub async fn reject(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    let form = workflow::review_form(
        &state,
        &admin,
        id,
        ReviewDecision::Reject,
        input.feedback.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// PUT /api/v1/admin/forms/{id}/meeting
pub async fn update_meeting(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMeeting>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    workflow::find_form(&state.pool, id).await?;
    let form = AppFormRepo::update_meeting(&state.pool, id, &input)
        .await?
        .ok_or_else(|| form_gone(id))?;

    record_form_activity(
        &state,
        &admin,
        &form,
        ACTION_MEETING_UPDATED,
        "Updated the kickoff meeting",
        serde_json::json!({
            "meeting_scheduled": form.meeting_scheduled,
            "meeting_date": form.meeting_date,
            "meeting_time": form.meeting_time,
        }),
    )
    .await;

    Ok(Json(DataResponse { data: form }))
}

/// PUT /api/v1/admin/forms/{id}/project-status
///
/// Moving to `completed` stamps `completion_date`.
pub async fn update_project_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectStatus>,
) -> AppResult<Json<DataResponse<AppForm>>> {
    let step = ProjectStatus::from_str_value(input.project_status.trim())?;
    let previous = workflow::find_form(&state.pool, id).await?;

    let form = AppFormRepo::update_project_status(&state.pool, id, step.as_str())
        .await?
        .ok_or_else(|| form_gone(id))?;

    tracing::info!(
        form_id = id,
        from = %previous.project_status,
        to = step.as_str(),
        "Project status changed"
    );

    record_form_activity(
        &state,
        &admin,
        &form,
        ACTION_PROJECT_STATUS_CHANGED,
        &format!("Moved the project to {}", step.as_str()),
        serde_json::json!({
            "from": previous.project_status,
            "to": step.as_str(),
            "step": step.step_index(),
        }),
    )
    .await;

    Ok(Json(DataResponse { data: form }))
}

fn form_gone(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "AppForm",
        id,
    })
}

async fn record_form_activity(
    state: &AppState,
    admin: &AuthUser,
    form: &AppForm,
    action_type: &'static str,
    what: &str,
    metadata: serde_json::Value,
) {
    let client_name = match ClientRepo::find_by_id(&state.pool, form.client_id).await {
        Ok(Some(client)) => client.name,
        _ => format!("client {}", form.client_id),
    };
    activity::record(
        &state.pool,
        admin,
        Activity {
            action_type,
            description: format!("{what} for {client_name}"),
            target: Some((TARGET_FORM, form.id, &client_name)),
            metadata: Some(metadata),
        },
    )
    .await;
}
