//! Unauthenticated `/public` endpoints: model profiles and voting.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use swing_core::competition::is_available;
use swing_core::error::CoreError;
use swing_core::events::EVENT_VOTE_CAST;
use swing_core::profile::Profile;
use swing_core::registration::RegistrationStatus;
use swing_core::types::EntityId;
use swing_core::validation::check;
use swing_core::voting::{
    find_package, free_vote_eligibility, VoteEligibility, VotePackage, VOTE_PACKAGES,
};
use swing_db::models::registration::{Registration, RegistrationFilter};
use swing_db::models::user::User;
use swing_db::models::vote::{CreateVote, Vote, VoteFilter};
use swing_events::PlatformEvent;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::handlers::competition::find_competition;
use crate::leaderboard;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Publicly visible model profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub model_id: EntityId,
    pub name: String,
    pub image: Option<String>,
    pub profile: Option<Profile>,
    pub total_votes: i64,
    /// Active competition entries.
    pub registrations: Vec<Registration>,
}

/// Request body for `POST /public/profile/{modelId}/vote`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[validate(length(min = 1, max = 128))]
    pub voter_id: String,
    pub competition_id: Option<EntityId>,
    #[serde(default)]
    pub is_premium: bool,
    /// Premium package; appends that package's number of votes.
    pub package_id: Option<String>,
}

/// Result of a vote request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    /// The vote records appended by this request.
    pub votes: Vec<Vote>,
    /// All votes the model has received.
    pub total_votes: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatusQuery {
    pub voter_id: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_model(state: &AppState, model_id: &str) -> AppResult<User> {
    Ok(state
        .store
        .users
        .find_by_id(model_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Model", model_id))?)
}

async fn total_votes(state: &AppState, model_id: &str) -> AppResult<i64> {
    Ok(state
        .store
        .votes
        .count(&VoteFilter {
            model_id: Some(model_id.to_string()),
            ..Default::default()
        })
        .await?)
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// GET /api/public/profile/{modelId}
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(model_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<PublicProfile>>> {
    let user = find_model(&state, &model_id).await?;
    let total_votes = total_votes(&state, &model_id).await?;
    let registrations = state
        .store
        .registrations
        .list(&RegistrationFilter {
            model_id: Some(model_id.clone()),
            status: Some(RegistrationStatus::Active),
            ..Default::default()
        })
        .await?;

    Ok(Json(DataResponse::new(PublicProfile {
        profile: user.profile().cloned(),
        model_id: user.id,
        name: user.name,
        image: user.image,
        total_votes,
        registrations,
    })))
}

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

/// POST /api/public/profile/{modelId}/vote
///
/// Append one free vote, one premium vote (`isPremium`), or a premium
/// package's worth of votes (`packageId`). Votes tied to a competition
/// trigger a re-tally of its standings.
///
/// Free votes are only rate limited when `ENFORCE_FREE_VOTE_COOLDOWN` is
/// set; otherwise repeated votes are all recorded.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(model_id): Path<EntityId>,
    AppJson(input): AppJson<VoteRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<VoteReceipt>>)> {
    check(&input)?;
    find_model(&state, &model_id).await?;

    if let Some(competition_id) = &input.competition_id {
        let competition = find_competition(&state, competition_id).await?;
        if !is_available(&competition.status, competition.end_date, Utc::now()) {
            return Err(AppError::BadRequest(
                "Competition is not accepting votes".into(),
            ));
        }
        if state
            .store
            .registrations
            .find_active(competition_id, &model_id)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest(
                "Model is not registered in this competition".into(),
            ));
        }
    }

    let (count, is_premium) = match input.package_id.as_deref() {
        Some(package_id) => (find_package(package_id)?.votes, true),
        None => (1, input.is_premium),
    };

    if !is_premium && state.config.enforce_free_vote_cooldown {
        let last = state
            .store
            .votes
            .last_vote_at(&input.voter_id, &model_id, false)
            .await?;
        let eligibility = free_vote_eligibility(last, Utc::now());
        if !eligibility.can_vote {
            return Err(CoreError::RateLimited(format!(
                "You can vote for this model again in {} hours",
                eligibility.hours_remaining
            ))
            .into());
        }
    }

    let mut votes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let vote = Vote::new(CreateVote {
            model_id: model_id.clone(),
            competition_id: input.competition_id.clone(),
            voter_id: input.voter_id.clone(),
            is_premium,
            package_id: input.package_id.clone(),
        });
        votes.push(state.store.votes.insert(&vote).await?);
    }

    if let Some(competition_id) = &input.competition_id {
        leaderboard::retally(&state.store, competition_id).await?;
    }

    tracing::info!(
        model_id = %model_id,
        voter_id = %input.voter_id,
        votes = count,
        is_premium,
        "Vote cast"
    );

    let mut event = PlatformEvent::new(EVENT_VOTE_CAST)
        .with_actor(input.voter_id.clone())
        .with_target(model_id.clone())
        .with_payload(json!({
            "votes": count,
            "isPremium": is_premium,
            "packageId": input.package_id,
        }));
    if let Some(competition_id) = &input.competition_id {
        event = event.with_source("competition", competition_id.clone());
    }
    state.event_bus.publish(event);

    let total_votes = total_votes(&state, &model_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(VoteReceipt { votes, total_votes })),
    ))
}

/// GET /api/public/profile/{modelId}/vote-status?voterId=
///
/// Free-vote eligibility for a voter, from stored free votes.
pub async fn vote_status(
    State(state): State<AppState>,
    Path(model_id): Path<EntityId>,
    AppQuery(params): AppQuery<VoteStatusQuery>,
) -> AppResult<Json<DataResponse<VoteEligibility>>> {
    if params.voter_id.trim().is_empty() {
        return Err(AppError::BadRequest("voterId is required".into()));
    }
    find_model(&state, &model_id).await?;

    let last = state
        .store
        .votes
        .last_vote_at(&params.voter_id, &model_id, false)
        .await?;
    Ok(Json(DataResponse::new(free_vote_eligibility(
        last,
        Utc::now(),
    ))))
}

/// GET /api/public/vote-packages
pub async fn list_vote_packages() -> Json<DataResponse<&'static [VotePackage]>> {
    Json(DataResponse::new(VOTE_PACKAGES))
}
