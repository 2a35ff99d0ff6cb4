//! Route definitions for the caller's own client record (`/me`).

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET    /client                       -> get_client
/// GET    /form                         -> get_form
/// PATCH  /form                         -> update_form
/// POST   /form/corrections-complete    -> complete_corrections
/// GET    /form/images                  -> list_images
/// POST   /form/images                  -> upload_image (multipart)
/// DELETE /form/images/{id}             -> delete_image
/// GET    /form/image-slots             -> image_slots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/client", get(me::get_client))
        .route("/form", get(me::get_form).patch(me::update_form))
        .route(
            "/form/corrections-complete",
            post(me::complete_corrections),
        )
        .route(
            "/form/images",
            get(me::list_images).post(me::upload_image),
        )
        .route("/form/images/{id}", delete(me::delete_image))
        .route("/form/image-slots", get(me::image_slots))
}
