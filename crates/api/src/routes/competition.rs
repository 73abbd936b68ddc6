//! Route definitions for `/competitions`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::competition;
use crate::state::AppState;

/// ```text
/// GET    /                   -> list_competitions
/// GET    /available          -> list_available
/// GET    /{id}               -> get_competition
/// POST   /{id}/join          -> join_competition (auth)
/// POST   /{id}/withdraw      -> withdraw_competition (auth)
/// GET    /{id}/leaderboard   -> get_leaderboard
/// GET    /{id}/prizes        -> list_competition_prizes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(competition::list_competitions))
        .route("/available", get(competition::list_available))
        .route("/{id}", get(competition::get_competition))
        .route("/{id}/join", post(competition::join_competition))
        .route("/{id}/withdraw", post(competition::withdraw_competition))
        .route("/{id}/leaderboard", get(competition::get_leaderboard))
        .route("/{id}/prizes", get(competition::list_competition_prizes))
}
