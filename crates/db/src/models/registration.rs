//! Registration entity model: links a model to a competition with a status
//! and vote tally.

use serde::Serialize;
use sqlx::FromRow;
use swing_core::registration::RegistrationStatus;
use swing_core::types::{new_id, EntityId, Timestamp};

/// A row from the `registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: EntityId,
    pub competition_id: EntityId,
    pub model_id: EntityId,
    pub status: String,
    pub votes: i64,
    pub ranking: i32,
    pub registered_at: Timestamp,
    pub withdrawn_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl Registration {
    /// A fresh active registration with no votes and no ranking yet.
    pub fn new(competition_id: &str, model_id: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: new_id(),
            competition_id: competition_id.to_string(),
            model_id: model_id.to_string(),
            status: RegistrationStatus::Active.as_str().to_string(),
            votes: 0,
            ranking: 0,
            registered_at: now,
            withdrawn_at: None,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RegistrationStatus::Active.as_str()
    }
}

/// Filter for registration listings.
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub competition_id: Option<EntityId>,
    pub model_id: Option<EntityId>,
    pub status: Option<RegistrationStatus>,
}

impl RegistrationFilter {
    pub fn active_in(competition_id: &str) -> Self {
        Self {
            competition_id: Some(competition_id.to_string()),
            status: Some(RegistrationStatus::Active),
            ..Default::default()
        }
    }

    pub fn matches(&self, registration: &Registration) -> bool {
        self.competition_id
            .as_ref()
            .map_or(true, |c| &registration.competition_id == c)
            && self
                .model_id
                .as_ref()
                .map_or(true, |m| &registration.model_id == m)
            && self
                .status
                .map_or(true, |s| registration.status == s.as_str())
    }
}
