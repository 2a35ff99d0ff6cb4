//! On-demand triggers for maintenance work that otherwise runs on a timer.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::background::inactivity_scan;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::services::activity::{
    self, Activity, ACTION_INACTIVITY_SCAN, ACTION_PROGRESS_RECALCULATED,
};
use crate::services::workflow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub updated: usize,
}

/// POST /api/v1/admin/forms/recalculate
///
/// Recompute progress and status of every form.
pub async fn recalculate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<RecalculateResponse>>> {
    let updated = workflow::recalculate_all(&state.pool).await?;

    activity::record(
        &state.pool,
        &admin,
        Activity {
            action_type: ACTION_PROGRESS_RECALCULATED,
            description: format!("Recalculated progress, {updated} form(s) changed"),
            target: None,
            metadata: Some(serde_json::json!({ "updated": updated })),
        },
    )
    .await;

    Ok(Json(DataResponse {
        data: RecalculateResponse { updated },
    }))
}

#[derive(Debug, Serialize)]
pub struct InactivityScanResponse {
    pub warned: usize,
}

/// POST /api/v1/admin/inactivity-scan
pub async fn inactivity_scan(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<InactivityScanResponse>>> {
    let warned = inactivity_scan::scan_once(&state.pool, state.clock.as_ref()).await?;

    activity::record(
        &state.pool,
        &admin,
        Activity {
            action_type: ACTION_INACTIVITY_SCAN,
            description: format!("Ran the inactivity scan, {warned} client(s) reported"),
            target: None,
            metadata: Some(serde_json::json!({ "warned": warned })),
        },
    )
    .await;

    Ok(Json(DataResponse {
        data: InactivityScanResponse { warned },
    }))
}
