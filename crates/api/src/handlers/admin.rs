//! Admin-only management of competitions and prizes.
//!
//! Every handler takes [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use swing_core::competition::validate_dates;
use swing_core::error::CoreError;
use swing_core::types::EntityId;
use swing_core::validation::{check, require_non_blank};
use swing_db::models::competition::{Competition, CreateCompetition, UpdateCompetition};
use swing_db::models::prize::{CreatePrize, Prize, UpdatePrize};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::competition::find_competition;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

/// POST /api/admin/competitions
pub async fn create_competition(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCompetition>,
) -> AppResult<(StatusCode, Json<DataResponse<Competition>>)> {
    check(&input)?;
    require_non_blank("title", &input.title)?;
    validate_dates(input.start_date, input.end_date)?;

    let competition = state
        .store
        .competitions
        .insert(&Competition::new(input))
        .await?;

    tracing::info!(
        competition_id = %competition.id,
        admin_id = %admin.user_id,
        "Competition created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(competition))))
}

/// PUT /api/admin/competitions/{id}
pub async fn update_competition(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    AppJson(input): AppJson<UpdateCompetition>,
) -> AppResult<Json<DataResponse<Competition>>> {
    check(&input)?;
    if let Some(title) = &input.title {
        require_non_blank("title", title)?;
    }

    // Date order is checked against the merged result.
    let existing = find_competition(&state, &id).await?;
    validate_dates(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.unwrap_or(existing.end_date),
    )?;

    let competition = state
        .store
        .competitions
        .update(&id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Competition", id.clone()))?;

    tracing::info!(competition_id = %id, admin_id = %admin.user_id, "Competition updated");
    Ok(Json(DataResponse::new(competition)))
}

/// DELETE /api/admin/competitions/{id}
pub async fn delete_competition(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    if !state.store.delete_competition(&id).await? {
        return Err(CoreError::not_found("Competition", id).into());
    }
    tracing::info!(competition_id = %id, admin_id = %admin.user_id, "Competition deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Prizes
// ---------------------------------------------------------------------------

/// POST /api/admin/prizes
pub async fn create_prize(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreatePrize>,
) -> AppResult<(StatusCode, Json<DataResponse<Prize>>)> {
    check(&input)?;
    require_non_blank("title", &input.title)?;
    find_competition(&state, &input.competition_id).await?;

    let prize = state.store.prizes.insert(&Prize::new(input)).await?;

    tracing::info!(prize_id = %prize.id, admin_id = %admin.user_id, "Prize created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(prize))))
}

/// PUT /api/admin/prizes/{id}
pub async fn update_prize(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    AppJson(input): AppJson<UpdatePrize>,
) -> AppResult<Json<DataResponse<Prize>>> {
    check(&input)?;
    if let Some(title) = &input.title {
        require_non_blank("title", title)?;
    }

    let prize = state
        .store
        .prizes
        .update(&id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Prize", id.clone()))?;

    tracing::info!(prize_id = %id, admin_id = %admin.user_id, "Prize updated");
    Ok(Json(DataResponse::new(prize)))
}

/// DELETE /api/admin/prizes/{id}
pub async fn delete_prize(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    if !state.store.prizes.delete(&id).await? {
        return Err(CoreError::not_found("Prize", id).into());
    }
    tracing::info!(prize_id = %id, admin_id = %admin.user_id, "Prize deleted");
    Ok(StatusCode::NO_CONTENT)
}
