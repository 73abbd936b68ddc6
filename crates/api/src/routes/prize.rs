use axum::routing::get;
use axum::Router;

use crate::handlers::prize;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(prize::list_prizes))
}
