//! Admin-only routes: competition and prize management.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use swing_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A signed-in caller holding the `admin` role. Any other valid session is
/// a 403; no session at all is a 401.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.user_id, role = %user.role, "Admin route refused");
            return Err(CoreError::Forbidden("Only admins can manage competitions".into()).into());
        }
        Ok(RequireAdmin(user))
    }
}
