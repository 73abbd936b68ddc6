//! Periodic closing of expired competitions.
//!
//! Active competitions whose end date has passed are re-tallied one last
//! time and moved to `ended`, which freezes their leaderboard.

use std::time::Duration;

use chrono::Utc;
use swing_core::competition::CompetitionStatus;
use swing_db::models::competition::{CompetitionFilter, UpdateCompetition};
use swing_db::{DbResult, Store};
use tokio_util::sync::CancellationToken;

use crate::leaderboard;

/// Run the sweep loop every `interval` until `cancel` fires.
pub async fn run(store: Store, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Competition lifecycle job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Competition lifecycle job stopping");
                break;
            }
            _ = ticker.tick() => {
                match close_expired(&store).await {
                    Ok(0) => tracing::debug!("Competition lifecycle: nothing to close"),
                    Ok(closed) => tracing::info!(closed, "Competition lifecycle: closed competitions"),
                    Err(e) => tracing::error!(error = %e, "Competition lifecycle: sweep failed"),
                }
            }
        }
    }
}

/// Close every active competition that has ended. Returns how many were
/// closed.
///
/// A competition that fails to close is logged and retried on the next
/// sweep; the rest are still processed.
pub async fn close_expired(store: &Store) -> DbResult<usize> {
    let now = Utc::now();
    let active = store
        .competitions
        .list(&CompetitionFilter {
            status: Some(CompetitionStatus::Active.as_str().to_string()),
            available_at: None,
        })
        .await?;

    let mut closed = 0;
    for competition in active.into_iter().filter(|c| c.end_date <= now) {
        match close_one(store, &competition.id).await {
            Ok(true) => {
                tracing::info!(competition_id = %competition.id, "Competition ended");
                closed += 1;
            }
            Ok(false) => {}
            Err(e) => tracing::error!(
                competition_id = %competition.id,
                error = %e,
                "Competition lifecycle: failed to close competition"
            ),
        }
    }
    Ok(closed)
}

/// Final re-tally, then mark the competition ended.
async fn close_one(store: &Store, competition_id: &str) -> DbResult<bool> {
    leaderboard::retally(store, competition_id).await?;
    let update = UpdateCompetition {
        status: Some(CompetitionStatus::Ended),
        ..Default::default()
    };
    Ok(store
        .competitions
        .update(competition_id, &update)
        .await?
        .is_some())
}
