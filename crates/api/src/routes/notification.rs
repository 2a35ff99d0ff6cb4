//! The caller's own inbox. Admins and clients share these routes and only
//! ever see rows addressed to their profile.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification::{list_notifications, mark_all_read, mark_read, unread_count};
use crate::state::AppState;

/// Mounted at `/notifications`.
///
/// ```text
/// GET    /                 ?unread_only&limit
/// GET    /unread-count
/// POST   /read-all
/// POST   /{id}/read        404 if missing, foreign or already read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{id}/read", post(mark_read))
}
