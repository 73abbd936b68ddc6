//! Handlers for the caller's model profile (`/user/profile`), including
//! image uploads.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use swing_core::error::CoreError;
use swing_core::events::EVENT_PROFILE_CREATED;
use swing_core::profile::{Profile, ProfileDraft, ProfileUpdate, MAX_PROFILE_IMAGES};
use swing_core::types::new_id;
use swing_core::uploads::validate_image_upload;
use swing_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::user::current_user;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Public URL prefix under which `UPLOAD_DIR` is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

// ---------------------------------------------------------------------------
// Profile CRUD
// ---------------------------------------------------------------------------

/// GET /api/user/profile
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Profile>>> {
    let user = current_user(&state, &auth).await?;
    let profile = user
        .profile()
        .cloned()
        .ok_or_else(|| CoreError::not_found("Profile", auth.user_id.clone()))?;
    Ok(Json(DataResponse::new(profile)))
}

/// POST /api/user/profile
///
/// Create the caller's profile. 409 when one already exists.
pub async fn create_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<ProfileDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<Profile>>)> {
    input.validate_all()?;

    let user = current_user(&state, &auth).await?;
    let profile = input.into_profile();
    state
        .store
        .users
        .create_profile(&user.id, &profile)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user.id.clone()))?;

    tracing::info!(user_id = %user.id, "Profile created");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_PROFILE_CREATED)
            .with_source("user", user.id.clone())
            .with_actor(user.id.clone())
            .with_target(user.id.clone()),
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(profile))))
}

/// PUT /api/user/profile
///
/// Partial update; absent fields are left unchanged.
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<ProfileUpdate>,
) -> AppResult<Json<DataResponse<Profile>>> {
    input.validate_all()?;

    let user = current_user(&state, &auth).await?;
    let mut profile = user
        .profile()
        .cloned()
        .ok_or_else(|| CoreError::not_found("Profile", user.id.clone()))?;
    input.apply(&mut profile);

    state.store.users.set_profile(&user.id, &profile).await?;
    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(Json(DataResponse::new(profile)))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// POST /api/user/profile/images
///
/// Multipart upload of one or more image parts (any field name). Each part
/// must fit `MAX_UPLOAD_BYTES`, declare an allowed image mimetype and sniff
/// as that format. Stored files are appended to the profile's images.
pub async fn upload_images(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Profile>>)> {
    let user = current_user(&state, &auth).await?;
    let mut profile = user.profile().cloned().ok_or_else(|| {
        CoreError::Validation("Create a profile before uploading images".into())
    })?;

    // Validate every part before writing anything.
    let mut accepted: Vec<(&'static str, Vec<u8>)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let extension = validate_image_upload(
            content_type.as_deref(),
            &data,
            state.config.max_upload_bytes,
        )?;
        accepted.push((extension, data.to_vec()));
    }

    if accepted.is_empty() {
        return Err(AppError::BadRequest("No image files in request".into()));
    }
    if profile.images.len() + accepted.len() > MAX_PROFILE_IMAGES {
        return Err(CoreError::Validation(format!(
            "A profile can hold at most {MAX_PROFILE_IMAGES} images"
        ))
        .into());
    }

    let user_dir = state.config.upload_dir.join(&user.id);
    tokio::fs::create_dir_all(&user_dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    for (extension, data) in accepted {
        let filename = format!("{}.{extension}", new_id());
        tokio::fs::write(user_dir.join(&filename), &data)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        profile
            .images
            .push(format!("{UPLOADS_URL_PREFIX}/{}/{filename}", user.id));
    }

    state.store.users.set_profile(&user.id, &profile).await?;
    tracing::info!(
        user_id = %user.id,
        images = profile.images.len(),
        "Profile images uploaded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(profile))))
}
