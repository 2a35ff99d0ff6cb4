//! Bearer-token extractor that resolves the caller's profile.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use intake_core::error::CoreError;
use intake_core::types::DbId;
use intake_db::repositories::ProfileRepo;
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from the `Authorization` header.
///
/// The token only proves the identity; the role is read from the caller's
/// profile row on every request.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(profile_id = user.profile_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Internal `profiles.id`.
    pub profile_id: DbId,
    /// Identity-service user id (the token subject).
    pub auth_user_id: Uuid,
    pub email: String,
    pub name: String,
    /// `"admin"` or `"client"`.
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let profile = ProfileRepo::find_by_auth_user_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(auth_user_id = %claims.sub, "Token subject has no profile");
                AppError::Core(CoreError::Unauthorized(
                    "No profile is registered for this identity".into(),
                ))
            })?;

        Ok(AuthUser {
            profile_id: profile.id,
            auth_user_id: profile.auth_user_id,
            email: profile.email,
            name: profile.name,
            role: profile.role,
        })
    }
}
