//! Handlers for administrator accounts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use intake_db::models::profile::Profile;
use intake_db::repositories::ProfileRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::services::accounts::{self, CreateAdminRequest};
use crate::state::AppState;

/// GET /api/v1/admin/admins
pub async fn list_admins(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Profile>>>> {
    let admins = ProfileRepo::list_admins(&state.pool).await?;
    Ok(Json(DataResponse { data: admins }))
}

/// POST /api/v1/admin/admins
pub async fn create_admin(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Profile>>)> {
    let profile = accounts::create_admin(&state, &admin, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}
