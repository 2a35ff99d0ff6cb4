//! Route definitions for the administrator console (`/admin`).
//!
//! Every handler behind these routes requires the `admin` role.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{activity, admin_clients, admin_forms, admin_jobs, admins};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /clients                      -> list_clients
/// POST   /clients                      -> create_client
/// GET    /clients/{id}                 -> get_client
/// DELETE /clients/{id}                 -> delete_client
/// PUT    /clients/{id}/status          -> update_status
/// PUT    /clients/{id}/notes           -> update_notes
/// GET    /clients/{id}/export          -> export_client (zip)
///
/// POST   /forms/recalculate            -> recalculate
/// GET    /forms/{id}                   -> get_form
/// GET    /forms/{id}/images            -> list_images
/// POST   /forms/{id}/approve           -> approve
/// POST   /forms/{id}/reject            -> reject
/// PUT    /forms/{id}/meeting           -> update_meeting
/// PUT    /forms/{id}/project-status    -> update_project_status
///
/// GET    /admins                       -> list_admins
/// POST   /admins                       -> create_admin
/// GET    /activity                     -> list_activity
/// POST   /inactivity-scan              -> inactivity_scan
/// ```
pub fn router() -> Router<AppState> {
    let clients = Router::new()
        .route(
            "/",
            get(admin_clients::list_clients).post(admin_clients::create_client),
        )
        .route(
            "/{id}",
            get(admin_clients::get_client).delete(admin_clients::delete_client),
        )
        .route("/{id}/status", put(admin_clients::update_status))
        .route("/{id}/notes", put(admin_clients::update_notes))
        .route("/{id}/export", get(admin_clients::export_client));

    let forms = Router::new()
        .route("/recalculate", post(admin_jobs::recalculate))
        .route("/{id}", get(admin_forms::get_form))
        .route("/{id}/images", get(admin_forms::list_images))
        .route("/{id}/approve", post(admin_forms::approve))
        .route("/{id}/reject", post(admin_forms::reject))
        .route("/{id}/meeting", put(admin_forms::update_meeting))
        .route(
            "/{id}/project-status",
            put(admin_forms::update_project_status),
        );

    Router::new()
        .nest("/clients", clients)
        .nest("/forms", forms)
        .route(
            "/admins",
            get(admins::list_admins).post(admins::create_admin),
        )
        .route("/activity", get(activity::list_activity))
        .route("/inactivity-scan", post(admin_jobs::inactivity_scan))
}
