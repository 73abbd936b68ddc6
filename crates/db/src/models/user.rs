//! User entity model and DTOs.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use swing_core::profile::Profile;
use swing_core::types::{new_id, EntityId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    #[serde(skip_serializing)]
    pub google_id: Option<String>,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: String,
    pub onboarding_completed: bool,
    pub profile: Option<Json<Profile>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Build a new user row with a generated id.
    pub fn new(input: CreateUser) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: new_id(),
            google_id: input.google_id,
            email: input.email,
            name: input.name,
            image: input.image,
            role: input.role,
            onboarding_completed: false,
            profile: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref().map(|p| &p.0)
    }
}

/// DTO for creating a user at first sign-in.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub google_id: Option<String>,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: String,
}

/// DTO for updating a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: Option<String>,
    pub onboarding_completed: Option<bool>,
}

impl UpdateUser {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(image) = &self.image {
            user.image = Some(image.clone());
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
        if let Some(done) = self.onboarding_completed {
            user.onboarding_completed = done;
        }
        user.updated_at = chrono::Utc::now();
    }
}
