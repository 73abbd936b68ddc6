//! Route definitions for `/user`. All endpoints require authentication.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use swing_core::profile::MAX_PROFILE_IMAGES;

use crate::handlers::{profile, user};
use crate::state::AppState;

/// Headroom for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// ```text
/// GET, PATCH       /                 -> get_user, update_user
/// GET, POST, PUT   /profile          -> get_profile, create_profile, update_profile
/// POST             /profile/images   -> upload_images
/// GET              /registrations    -> list_registrations
/// ```
///
/// The upload route accepts bodies up to one full set of maximum-size
/// images.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    let upload_limit = max_upload_bytes
        .saturating_mul(MAX_PROFILE_IMAGES)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(user::get_user).patch(user::update_user))
        .route(
            "/profile",
            get(profile::get_profile)
                .post(profile::create_profile)
                .put(profile::update_profile),
        )
        .route(
            "/profile/images",
            post(profile::upload_images).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/registrations", get(user::list_registrations))
}
