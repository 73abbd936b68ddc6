//! Prize entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use swing_core::types::{new_id, EntityId, Timestamp};
use validator::Validate;

/// A row from the `prizes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: EntityId,
    pub competition_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    /// Finishing position the prize is awarded for (1 = winner).
    pub placement: i32,
    pub value: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Prize {
    pub fn new(input: CreatePrize) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: new_id(),
            competition_id: input.competition_id,
            title: input.title.trim().to_string(),
            description: input.description,
            placement: input.placement,
            value: input.value,
            created_at: now,
            updated_at: now,
        }
    }
}

/// DTO for creating a prize.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrize {
    #[validate(length(min = 1))]
    pub competition_id: EntityId,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub placement: i32,
    #[validate(length(max = 100))]
    pub value: Option<String>,
}

/// DTO for updating a prize. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrize {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub placement: Option<i32>,
    #[validate(length(max = 100))]
    pub value: Option<String>,
}

impl UpdatePrize {
    pub fn apply(&self, prize: &mut Prize) {
        if let Some(title) = &self.title {
            prize.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            prize.description = Some(description.clone());
        }
        if let Some(placement) = self.placement {
            prize.placement = placement;
        }
        if let Some(value) = &self.value {
            prize.value = Some(value.clone());
        }
        prize.updated_at = chrono::Utc::now();
    }
}
