//! Handlers for the public `/competitions` resource and the join/withdraw
//! actions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use swing_core::competition::{check_joinable, CompetitionStatus};
use swing_core::error::CoreError;
use swing_core::events::{EVENT_COMPETITION_JOINED, EVENT_COMPETITION_WITHDRAWN};
use swing_core::types::EntityId;
use swing_db::models::competition::{Competition, CompetitionFilter};
use swing_db::models::prize::Prize;
use swing_db::models::registration::{Registration, RegistrationFilter};
use swing_events::PlatformEvent;

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::leaderboard::{self, LeaderboardEntry};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /competitions`.
#[derive(Debug, Deserialize)]
pub struct CompetitionListQuery {
    /// `active`, `coming-soon` or `ended` (legacy aliases accepted).
    pub status: Option<String>,
}

/// A competition with its current number of active participants.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDetail {
    #[serde(flatten)]
    pub competition: Competition,
    pub participant_count: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_competition(state: &AppState, id: &str) -> AppResult<Competition> {
    Ok(state
        .store
        .competitions
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Competition", id))?)
}

async fn active_registrations(state: &AppState, id: &str) -> AppResult<Vec<Registration>> {
    Ok(state
        .store
        .registrations
        .list(&RegistrationFilter::active_in(id))
        .await?)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/competitions
pub async fn list_competitions(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CompetitionListQuery>,
) -> AppResult<Json<DataResponse<Vec<Competition>>>> {
    let status = params
        .status
        .as_deref()
        .map(CompetitionStatus::from_str_db)
        .transpose()?
        .map(|s| s.as_str().to_string());

    let competitions = state
        .store
        .competitions
        .list(&CompetitionFilter {
            status,
            available_at: None,
        })
        .await?;
    Ok(Json(DataResponse::new(competitions)))
}

/// GET /api/competitions/available
///
/// Active competitions whose end date has not passed.
pub async fn list_available(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Competition>>>> {
    let competitions = state
        .store
        .competitions
        .list(&CompetitionFilter {
            status: None,
            available_at: Some(Utc::now()),
        })
        .await?;
    Ok(Json(DataResponse::new(competitions)))
}

/// GET /api/competitions/{id}
pub async fn get_competition(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<CompetitionDetail>>> {
    let competition = find_competition(&state, &id).await?;
    let participant_count = active_registrations(&state, &id).await?.len();
    Ok(Json(DataResponse::new(CompetitionDetail {
        competition,
        participant_count,
    })))
}

/// GET /api/competitions/{id}/leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<LeaderboardEntry>>>> {
    find_competition(&state, &id).await?;
    let entries = leaderboard::leaderboard(&state.store, &id).await?;
    Ok(Json(DataResponse::new(entries)))
}

/// GET /api/competitions/{id}/prizes
pub async fn list_competition_prizes(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<Prize>>>> {
    find_competition(&state, &id).await?;
    let prizes = state.store.prizes.list(Some(&id)).await?;
    Ok(Json(DataResponse::new(prizes)))
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// POST /api/competitions/{id}/join
///
/// Register the caller. 409 when already actively registered, 400 when the
/// competition is not open or is full.
pub async fn join_competition(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<(StatusCode, Json<DataResponse<Registration>>)> {
    let competition = find_competition(&state, &id).await?;

    if state
        .store
        .registrations
        .find_active(&id, &auth.user_id)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(
            "Model is already registered for this competition".into(),
        )
        .into());
    }

    let participants = active_registrations(&state, &id).await?.len();
    check_joinable(
        &competition.status,
        competition.end_date,
        Utc::now(),
        i64::try_from(participants).unwrap_or(i64::MAX),
        competition.max_participants,
    )?;

    let registration = state.store.registrations.register(&id, &auth.user_id).await?;
    leaderboard::retally(&state.store, &id).await?;

    tracing::info!(
        competition_id = %id,
        model_id = %auth.user_id,
        registration_id = %registration.id,
        "Model joined competition"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_COMPETITION_JOINED)
            .with_source("competition", id.clone())
            .with_actor(auth.user_id.clone())
            .with_target(auth.user_id.clone())
            .with_payload(json!({ "competitionTitle": competition.title })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(registration))))
}

/// POST /api/competitions/{id}/withdraw
///
/// Soft-withdraw the caller's active registration.
pub async fn withdraw_competition(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Registration>>> {
    let competition = find_competition(&state, &id).await?;

    let active = state
        .store
        .registrations
        .find_active(&id, &auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Registration", format!("{id}/{}", auth.user_id)))?;

    let withdrawn = state
        .store
        .registrations
        .withdraw(&active.id)
        .await?
        .ok_or_else(|| CoreError::not_found("Registration", active.id.clone()))?;
    leaderboard::retally(&state.store, &id).await?;

    tracing::info!(
        competition_id = %id,
        model_id = %auth.user_id,
        "Model withdrew from competition"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_COMPETITION_WITHDRAWN)
            .with_source("competition", id.clone())
            .with_actor(auth.user_id.clone())
            .with_target(auth.user_id.clone())
            .with_payload(json!({ "competitionTitle": competition.title })),
    );

    Ok(Json(DataResponse::new(withdrawn)))
}
