pub mod admin;
pub mod health;
pub mod me;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me/client                                       own client record (client)
/// /me/form                                         get, patch (client)
/// /me/form/corrections-complete                    acknowledge rejection (client)
/// /me/form/images                                  list, upload (client)
/// /me/form/images/{id}                             delete (client)
/// /me/form/image-slots                             slot table with counts (client)
///
/// /admin/clients                                   list, create (admin only)
/// /admin/clients/{id}                              get, delete
/// /admin/clients/{id}/status                       set status (PUT)
/// /admin/clients/{id}/notes                        set notes (PUT)
/// /admin/clients/{id}/export                       zip download
/// /admin/forms/recalculate                         recompute every form (POST)
/// /admin/forms/{id}                                get
/// /admin/forms/{id}/images                         list
/// /admin/forms/{id}/approve                        approve (POST)
/// /admin/forms/{id}/reject                         reject with feedback (POST)
/// /admin/forms/{id}/meeting                        schedule meeting (PUT)
/// /admin/forms/{id}/project-status                 move pipeline (PUT)
/// /admin/admins                                    list, create
/// /admin/activity                                  activity log
/// /admin/inactivity-scan                           run scan now (POST)
///
/// /notifications                                   list (any profile)
/// /notifications/unread-count                      unread count
/// /notifications/read-all                          mark all read (POST)
/// /notifications/{id}/read                         mark one read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/me", me::router())
        .nest("/admin", admin::router())
        .nest("/notifications", notification::router())
}
