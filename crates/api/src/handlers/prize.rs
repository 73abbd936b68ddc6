//! Handlers for the public `/prizes` listing.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use swing_db::models::prize::Prize;

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeListQuery {
    pub competition_id: Option<String>,
}

/// GET /api/prizes
pub async fn list_prizes(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PrizeListQuery>,
) -> AppResult<Json<DataResponse<Vec<Prize>>>> {
    let prizes = state
        .store
        .prizes
        .list(params.competition_id.as_deref())
        .await?;
    Ok(Json(DataResponse::new(prizes)))
}
