//! Route definitions for `/auth`.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST /google    -> google_sign_in (public)
/// POST /refresh   -> refresh (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", post(auth::google_sign_in))
        .route("/refresh", post(auth::refresh))
}
