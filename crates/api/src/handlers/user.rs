//! Handlers for the signed-in user's account (`/user`).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use swing_core::error::CoreError;
use swing_core::validation::check;
use swing_db::models::registration::{Registration, RegistrationFilter};
use swing_db::models::user::{UpdateUser, User};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /user`. Role changes are not accepted here.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
    pub onboarding_completed: Option<bool>,
}

/// Load the caller's user row or fail with 404.
pub(crate) async fn current_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    Ok(state
        .store
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id.clone()))?)
}

/// GET /api/user
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<User>>> {
    Ok(Json(DataResponse::new(current_user(&state, &auth).await?)))
}

/// PATCH /api/user
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<User>>> {
    check(&input)?;

    let update = UpdateUser {
        name: input.name.map(|n| n.trim().to_string()),
        image: input.image,
        role: None,
        onboarding_completed: input.onboarding_completed,
    };
    let user = state
        .store
        .users
        .update(&auth.user_id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id.clone()))?;

    tracing::info!(user_id = %user.id, "User updated");
    Ok(Json(DataResponse::new(user)))
}

/// GET /api/user/registrations
///
/// Every registration of the caller, withdrawn ones included.
pub async fn list_registrations(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Registration>>>> {
    let filter = RegistrationFilter {
        model_id: Some(auth.user_id),
        ..Default::default()
    };
    let registrations = state.store.registrations.list(&filter).await?;
    Ok(Json(DataResponse::new(registrations)))
}
