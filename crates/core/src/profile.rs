//! Model profile schema and validation.
//!
//! The same types are used as the request body on the server and as the
//! payload the onboarding sequencer assembles on the client.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::validation::{check, require_non_blank};

/// Instagram handles: optional leading `@`, 1-30 letters, digits, `.` or `_`.
const INSTAGRAM_PATTERN: &str = r"^@?[A-Za-z0-9._]{1,30}$";

static INSTAGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(INSTAGRAM_PATTERN).expect("valid regex"));

/// Maximum number of images attached to a profile.
pub const MAX_PROFILE_IMAGES: usize = 10;

/// Experience levels offered by the onboarding preferences step.
pub const EXPERIENCE_LEVELS: &[&str] = &["beginner", "intermediate", "professional"];

// ---------------------------------------------------------------------------
// Stored profile
// ---------------------------------------------------------------------------

/// A model's public profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub bio: String,
    pub location: Option<String>,
    pub instagram: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    pub experience_level: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

// ---------------------------------------------------------------------------
// Create / update payloads
// ---------------------------------------------------------------------------

/// Payload for creating a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    #[validate(length(min = 1, max = 80))]
    pub display_name: String,
    #[validate(length(min = 1, max = 1000))]
    pub bio: String,
    #[validate(length(max = 120))]
    pub location: Option<String>,
    pub instagram: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub goals: Vec<String>,
    pub experience_level: Option<String>,
}

impl ProfileDraft {
    /// Validate every field, including the rules `validator` cannot express.
    pub fn validate_all(&self) -> Result<(), CoreError> {
        check(self)?;
        require_non_blank("displayName", &self.display_name)?;
        require_non_blank("bio", &self.bio)?;
        validate_instagram(self.instagram.as_deref())?;
        validate_goals(&self.goals)?;
        validate_experience_level(self.experience_level.as_deref())
    }

    /// Convert into a stored profile with no images yet.
    pub fn into_profile(self) -> Profile {
        Profile {
            display_name: self.display_name.trim().to_string(),
            bio: self.bio.trim().to_string(),
            location: self.location,
            instagram: self.instagram,
            goals: self.goals,
            experience_level: self.experience_level,
            images: Vec::new(),
        }
    }
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 80))]
    pub display_name: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub bio: Option<String>,
    #[validate(length(max = 120))]
    pub location: Option<String>,
    pub instagram: Option<String>,
    #[validate(length(max = 10))]
    pub goals: Option<Vec<String>>,
    pub experience_level: Option<String>,
}

impl ProfileUpdate {
    pub fn validate_all(&self) -> Result<(), CoreError> {
        check(self)?;
        if let Some(name) = &self.display_name {
            require_non_blank("displayName", name)?;
        }
        if let Some(bio) = &self.bio {
            require_non_blank("bio", bio)?;
        }
        validate_instagram(self.instagram.as_deref())?;
        if let Some(goals) = &self.goals {
            validate_goals(goals)?;
        }
        validate_experience_level(self.experience_level.as_deref())
    }

    /// Apply the present fields to `profile`.
    pub fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.display_name {
            profile.display_name = name.trim().to_string();
        }
        if let Some(bio) = self.bio {
            profile.bio = bio.trim().to_string();
        }
        if self.location.is_some() {
            profile.location = self.location;
        }
        if self.instagram.is_some() {
            profile.instagram = self.instagram;
        }
        if let Some(goals) = self.goals {
            profile.goals = goals;
        }
        if self.experience_level.is_some() {
            profile.experience_level = self.experience_level;
        }
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

fn validate_instagram(handle: Option<&str>) -> Result<(), CoreError> {
    match handle {
        Some(h) if !INSTAGRAM_RE.is_match(h) => Err(CoreError::Validation(format!(
            "Invalid Instagram handle '{h}'"
        ))),
        _ => Ok(()),
    }
}

fn validate_goals(goals: &[String]) -> Result<(), CoreError> {
    if goals.iter().any(|g| g.trim().is_empty()) {
        return Err(CoreError::Validation("Goals must not be blank".to_string()));
    }
    Ok(())
}

fn validate_experience_level(level: Option<&str>) -> Result<(), CoreError> {
    match level {
        Some(l) if !EXPERIENCE_LEVELS.contains(&l) => Err(CoreError::Validation(format!(
            "Invalid experience level '{l}'. Must be one of: {}",
            EXPERIENCE_LEVELS.join(", ")
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProfileDraft {
        ProfileDraft {
            display_name: "Ava".to_string(),
            bio: "Vintage pin-up".to_string(),
            location: Some("Lisbon".to_string()),
            instagram: Some("@ava.pinup".to_string()),
            goals: vec!["win".to_string()],
            experience_level: Some("beginner".to_string()),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate_all().is_ok());
    }

    #[test]
    fn blank_bio_is_rejected() {
        let mut d = draft();
        d.bio = "   ".to_string();
        assert!(d.validate_all().is_err());
    }

    #[test]
    fn bad_instagram_is_rejected() {
        let mut d = draft();
        d.instagram = Some("not a handle!".to_string());
        assert!(d.validate_all().is_err());
    }

    #[test]
    fn unknown_experience_level_is_rejected() {
        let mut d = draft();
        d.experience_level = Some("legendary".to_string());
        assert!(d.validate_all().is_err());
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut profile = draft().into_profile();
        let update = ProfileUpdate {
            bio: Some(" New bio ".to_string()),
            ..Default::default()
        };
        update.validate_all().unwrap();
        update.apply(&mut profile);
        assert_eq!(profile.bio, "New bio");
        assert_eq!(profile.display_name, "Ava");
        assert_eq!(profile.location.as_deref(), Some("Lisbon"));
    }
}
