//! Competition entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use swing_core::competition::{is_available, CompetitionStatus};
use swing_core::types::{new_id, EntityId, Timestamp};
use validator::Validate;

/// A row from the `competitions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub max_participants: Option<i32>,
    pub cover_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Competition {
    /// Build a new competition row with a generated id.
    ///
    /// A missing status defaults to `coming-soon`.
    pub fn new(input: CreateCompetition) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: new_id(),
            title: input.title.trim().to_string(),
            description: input.description,
            status: input
                .status
                .unwrap_or(CompetitionStatus::ComingSoon)
                .as_str()
                .to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            max_participants: input.max_participants,
            cover_image: input.cover_image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// DTO for creating a competition.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetition {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub status: Option<CompetitionStatus>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
    #[validate(length(max = 2048))]
    pub cover_image: Option<String>,
}

/// DTO for updating a competition. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompetition {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub status: Option<CompetitionStatus>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
    #[validate(length(max = 2048))]
    pub cover_image: Option<String>,
}

impl UpdateCompetition {
    pub fn apply(&self, competition: &mut Competition) {
        if let Some(title) = &self.title {
            competition.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            competition.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            competition.status = status.as_str().to_string();
        }
        if let Some(start) = self.start_date {
            competition.start_date = start;
        }
        if let Some(end) = self.end_date {
            competition.end_date = end;
        }
        if let Some(max) = self.max_participants {
            competition.max_participants = Some(max);
        }
        if let Some(cover) = &self.cover_image {
            competition.cover_image = Some(cover.clone());
        }
        competition.updated_at = chrono::Utc::now();
    }
}

/// Filter for competition listings.
#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    /// Canonical status string (see [`CompetitionStatus::as_str`]).
    pub status: Option<String>,
    /// Only competitions that are active and end after this instant.
    pub available_at: Option<Timestamp>,
}

impl CompetitionFilter {
    pub fn matches(&self, competition: &Competition) -> bool {
        if let Some(status) = &self.status {
            if &competition.status != status {
                return false;
            }
        }
        if let Some(at) = self.available_at {
            if !is_available(&competition.status, competition.end_date, at) {
                return false;
            }
        }
        true
    }
}
