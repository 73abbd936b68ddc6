//! Handlers for the `/auth` resource (Google sign-in, token refresh).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use swing_core::error::CoreError;
use swing_core::roles::{ROLE_ADMIN, ROLE_MODEL};
use swing_core::validation::require_non_blank;
use swing_db::models::user::{CreateUser, UpdateUser, User};

use crate::auth::identity::VerifiedIdentity;
use crate::auth::jwt::generate_session_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/google`.
#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    /// Google ID token from the browser sign-in flow.
    pub credential: String,
}

/// Successful sign-in or refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/google
///
/// Verify the credential, find or create the matching user and issue a
/// session token. Emails listed in `ADMIN_EMAILS` are promoted to admin.
pub async fn google_sign_in(
    State(state): State<AppState>,
    AppJson(input): AppJson<GoogleSignInRequest>,
) -> AppResult<Json<DataResponse<SessionResponse>>> {
    require_non_blank("credential", &input.credential)?;

    let identity = state.identity.verify(&input.credential).await?;
    let mut user = find_or_create_user(&state, &identity).await?;

    if state.config.is_admin_email(&user.email) && user.role != ROLE_ADMIN {
        let promote = UpdateUser {
            role: Some(ROLE_ADMIN.to_string()),
            ..Default::default()
        };
        if let Some(updated) = state.store.users.update(&user.id, &promote).await? {
            tracing::info!(user_id = %updated.id, "User promoted to admin at sign-in");
            user = updated;
        }
    }

    tracing::info!(user_id = %user.id, role = %user.role, "User signed in");
    session_for(&state, user).map(|s| Json(DataResponse::new(s)))
}

/// POST /api/auth/refresh
///
/// Reissue a token from the caller's current user record, so role changes
/// take effect.
pub async fn refresh(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SessionResponse>>> {
    let user = state
        .store
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("User no longer exists".into()))?;

    session_for(&state, user).map(|s| Json(DataResponse::new(s)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_or_create_user(state: &AppState, identity: &VerifiedIdentity) -> AppResult<User> {
    if let Some(user) = state.store.users.find_by_google_id(&identity.subject).await? {
        return Ok(user);
    }
    if let Some(user) = state.store.users.find_by_email(&identity.email).await? {
        return Ok(user);
    }

    let role = if state.config.is_admin_email(&identity.email) {
        ROLE_ADMIN
    } else {
        ROLE_MODEL
    };
    let name = identity
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| identity.email.split('@').next().unwrap_or_default().to_string());

    let user = state
        .store
        .users
        .insert(&User::new(CreateUser {
            google_id: Some(identity.subject.clone()),
            email: identity.email.clone(),
            name,
            image: identity.picture.clone(),
            role: role.to_string(),
        }))
        .await?;
    tracing::info!(user_id = %user.id, role, "User created at first sign-in");
    Ok(user)
}

fn session_for(state: &AppState, user: User) -> AppResult<SessionResponse> {
    let token = generate_session_token(&user.id, &user.role, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Failed to sign session token: {e}")))?;
    Ok(SessionResponse {
        token,
        expires_in: state.config.jwt.expires_in_secs(),
        user,
    })
}
