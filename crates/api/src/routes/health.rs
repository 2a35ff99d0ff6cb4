//! Liveness probe for load balancers, mounted outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the image store accepts writes.
    pub storage_healthy: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, storage) = tokio::join!(intake_db::health_check(&state.pool), state.blobs.check());

    if let Err(e) = &db {
        tracing::warn!(error = %e, "Database health check failed");
    }
    if let Err(e) = &storage {
        tracing::warn!(error = %e, "Storage health check failed");
    }

    let (db_healthy, storage_healthy) = (db.is_ok(), storage.is_ok());
    Json(HealthResponse {
        status: if db_healthy && storage_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
