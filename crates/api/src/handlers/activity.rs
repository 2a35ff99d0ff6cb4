//! Handler for the administrator activity log.

use axum::extract::{Query, State};
use axum::Json;
use intake_db::models::activity_log::ActivityLog;
use intake_db::repositories::ActivityLogRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/activity
///
/// Newest first. Accepts `?limit=&offset=`.
pub async fn list_activity(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ActivityLog>>>> {
    let entries = ActivityLogRepo::list(&state.pool, params.limit(), params.offset()).await?;
    Ok(Json(DataResponse { data: entries }))
}
