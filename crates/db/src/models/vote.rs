//! Vote entity model. Votes are append-only.

use serde::Serialize;
use sqlx::FromRow;
use swing_core::types::{new_id, EntityId, Timestamp};

/// A row from the `votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: EntityId,
    pub model_id: EntityId,
    pub competition_id: Option<EntityId>,
    pub voter_id: String,
    pub is_premium: bool,
    pub package_id: Option<String>,
    pub created_at: Timestamp,
}

impl Vote {
    pub fn new(input: CreateVote) -> Self {
        Self {
            id: new_id(),
            model_id: input.model_id,
            competition_id: input.competition_id,
            voter_id: input.voter_id,
            is_premium: input.is_premium,
            package_id: input.package_id,
            created_at: chrono::Utc::now(),
        }
    }
}

/// DTO for appending a vote.
#[derive(Debug, Clone)]
pub struct CreateVote {
    pub model_id: EntityId,
    pub competition_id: Option<EntityId>,
    pub voter_id: String,
    pub is_premium: bool,
    pub package_id: Option<String>,
}

/// Filter for vote queries. Every present field must match.
#[derive(Debug, Clone, Default)]
pub struct VoteFilter {
    pub model_id: Option<EntityId>,
    pub voter_id: Option<String>,
    pub competition_id: Option<EntityId>,
    pub is_premium: Option<bool>,
    /// Only votes created at or after this instant.
    pub since: Option<Timestamp>,
}

impl VoteFilter {
    pub fn matches(&self, vote: &Vote) -> bool {
        self.model_id.as_ref().map_or(true, |m| &vote.model_id == m)
            && self.voter_id.as_ref().map_or(true, |v| &vote.voter_id == v)
            && self
                .competition_id
                .as_ref()
                .map_or(true, |c| vote.competition_id.as_ref() == Some(c))
            && self.is_premium.map_or(true, |p| vote.is_premium == p)
            && self.since.map_or(true, |s| vote.created_at >= s)
    }
}

/// Per-model vote count within a competition.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub model_id: EntityId,
    pub votes: i64,
}
