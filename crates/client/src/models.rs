//! Wire records as the REST API returns them, also used as the cached
//! shapes in the local store.

use serde::{Deserialize, Serialize};
use swing_core::competition::is_available;
use swing_core::profile::Profile;
use swing_core::registration::RegistrationStatus;
use swing_core::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Users and sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: String,
    #[serde(default)]
    pub onboarding_completed: bool,
    pub profile: Option<Profile>,
}

/// Body for `PATCH /api/user`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
}

impl UserUpdate {
    pub fn onboarding_completed() -> Self {
        Self {
            onboarding_completed: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
}

impl Competition {
    pub fn is_available(&self, now: Timestamp) -> bool {
        is_available(&self.status, self.end_date, now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: EntityId,
    pub competition_id: EntityId,
    pub model_id: EntityId,
    pub status: RegistrationStatus,
    #[serde(default)]
    pub votes: i64,
    /// Zero until the first tally.
    #[serde(default)]
    pub ranking: i32,
    pub registered_at: Timestamp,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        self.status == RegistrationStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub ranking: i32,
    pub registration_id: EntityId,
    pub model_id: EntityId,
    pub display_name: Option<String>,
    pub image: Option<String>,
    pub votes: i64,
    pub registered_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// Body for `POST /api/public/profile/{modelId}/vote`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub voter_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competition_id: Option<EntityId>,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
}

impl VoteRequest {
    /// A single free vote.
    pub fn free(voter_id: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
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

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub votes: Vec<Vote>,
    pub total_votes: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePackage {
    pub id: String,
    pub name: String,
    pub votes: u32,
    pub price_cents: u32,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: EntityId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Timestamp,
}
