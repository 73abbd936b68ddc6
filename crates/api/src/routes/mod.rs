pub mod admin;
pub mod auth;
pub mod competition;
pub mod health;
pub mod notification;
pub mod prize;
pub mod public;
pub mod user;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /health                                  service health (public)
///
/// /auth/google                             Google sign-in (public)
/// /auth/refresh                            reissue session token
///
/// /user                                    get, update the caller
/// /user/profile                            get, create, update profile
/// /user/profile/images                     upload profile images (multipart)
/// /user/registrations                      caller's registrations
///
/// /competitions                            list (?status=)
/// /competitions/available                  active and not expired
/// /competitions/{id}                       detail with participant count
/// /competitions/{id}/join                  register caller
/// /competitions/{id}/withdraw              withdraw caller
/// /competitions/{id}/leaderboard           standings
/// /competitions/{id}/prizes                prizes for one competition
///
/// /prizes                                  all prizes (?competitionId=)
///
/// /admin/competitions                      create (admin)
/// /admin/competitions/{id}                 update, delete (admin)
/// /admin/prizes                            create (admin)
/// /admin/prizes/{id}                       update, delete (admin)
///
/// /public/profile/{model_id}               public model profile
/// /public/profile/{model_id}/vote          cast vote(s)
/// /public/profile/{model_id}/vote-status   free-vote eligibility (?voterId=)
/// /public/vote-packages                    premium vote packages
///
/// /notifications                           list (?unreadOnly&limit&offset)
/// /notifications/unread-count              unread count
/// /notifications/read-all                  mark all read
/// /notifications/{id}/read                 mark one read
/// /notifications/{id}                      delete
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/user", user::router(config.max_upload_bytes))
        .nest("/competitions", competition::router())
        .nest("/prizes", prize::router())
        .nest("/admin", admin::router())
        .nest("/public", public::router())
        .nest("/notifications", notification::router())
}
