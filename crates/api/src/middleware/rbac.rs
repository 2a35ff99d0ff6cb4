//! Role-based access control (RBAC) extractors.
//!
//! Profiles hold exactly one role, so each extractor accepts exactly one.
//! Administrators cannot use the client routes and clients cannot use the
//! console.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use intake_core::error::CoreError;
use intake_core::roles::{ROLE_ADMIN, ROLE_CLIENT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then reject with 403 unless the profile has `role`.
async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: &'static str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role != role {
        tracing::debug!(
            profile_id = user.profile_id,
            role = %user.role,
            required = role,
            "Role check failed"
        );
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "The '{role}' role is required"
        ))));
    }
    Ok(user)
}

/// The administrator console.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_ADMIN).await.map(Self)
    }
}

/// The `/me` routes, which act on the caller's own client record.
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_CLIENT).await.map(Self)
    }
}
