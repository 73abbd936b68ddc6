//! Route definitions for `/public`. No authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// ```text
/// GET    /profile/{model_id}               -> get_public_profile
/// POST   /profile/{model_id}/vote          -> cast_vote
/// GET    /profile/{model_id}/vote-status   -> vote_status
/// GET    /vote-packages                    -> list_vote_packages
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/{model_id}", get(public::get_public_profile))
        .route("/profile/{model_id}/vote", post(public::cast_vote))
        .route("/profile/{model_id}/vote-status", get(public::vote_status))
        .route("/vote-packages", get(public::list_vote_packages))
}
