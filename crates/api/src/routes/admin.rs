//! Route definitions for `/admin`. Every handler requires the admin role.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// POST          /competitions        -> create_competition
/// PUT, DELETE   /competitions/{id}   -> update_competition, delete_competition
/// POST          /prizes              -> create_prize
/// PUT, DELETE   /prizes/{id}         -> update_prize, delete_prize
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/competitions", post(admin::create_competition))
        .route(
            "/competitions/{id}",
            put(admin::update_competition).delete(admin::delete_competition),
        )
        .route("/prizes", post(admin::create_prize))
        .route(
            "/prizes/{id}",
            put(admin::update_prize).delete(admin::delete_prize),
        )
}
