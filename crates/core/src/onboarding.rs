//! Onboarding wizard step machine.
//!
//! Defines the fixed step sequence, the answer accumulator and the
//! transition rules. Persistence and the remote completion calls live in
//! the client crate; this module is pure state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::profile::ProfileDraft;

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

pub const STEP_WELCOME: &str = "welcome";
pub const STEP_PROFILE_SETUP: &str = "profile-setup";
pub const STEP_PREFERENCES: &str = "preferences";
pub const STEP_TUTORIAL: &str = "tutorial";
pub const STEP_RULES: &str = "rules";
pub const STEP_FIRST_COMPETITION: &str = "first-competition";
pub const STEP_DASHBOARD_TOUR: &str = "dashboard-tour";

/// Static description of one wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// 1 = profile, 2 = learning, 3 = first actions.
    pub phase: u8,
    pub required: bool,
}

/// The wizard steps, in order.
pub const STEPS: &[StepDescriptor] = &[
    StepDescriptor {
        id: STEP_WELCOME,
        title: "Welcome",
        phase: 1,
        required: false,
    },
    StepDescriptor {
        id: STEP_PROFILE_SETUP,
        title: "Set Up Your Profile",
        phase: 1,
        required: true,
    },
    StepDescriptor {
        id: STEP_PREFERENCES,
        title: "Your Goals",
        phase: 1,
        required: true,
    },
    StepDescriptor {
        id: STEP_TUTORIAL,
        title: "How Voting Works",
        phase: 2,
        required: false,
    },
    StepDescriptor {
        id: STEP_RULES,
        title: "Competition Rules",
        phase: 2,
        required: true,
    },
    StepDescriptor {
        id: STEP_FIRST_COMPETITION,
        title: "Join Your First Competition",
        phase: 3,
        required: false,
    },
    StepDescriptor {
        id: STEP_DASHBOARD_TOUR,
        title: "Dashboard Tour",
        phase: 3,
        required: false,
    },
];

// ---------------------------------------------------------------------------
// Answer keys
// ---------------------------------------------------------------------------

pub const DATA_KEY_NAME: &str = "name";
pub const DATA_KEY_BIO: &str = "bio";
pub const DATA_KEY_LOCATION: &str = "location";
pub const DATA_KEY_INSTAGRAM: &str = "instagram";
pub const DATA_KEY_GOALS: &str = "goals";
pub const DATA_KEY_EXPERIENCE_LEVEL: &str = "experienceLevel";

/// Storage key prefix for a user's in-progress onboarding state.
pub const STORAGE_KEY_PREFIX: &str = "onboarding_";

/// Storage key holding `user_id`'s onboarding state.
pub fn storage_key(user_id: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{user_id}")
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Accumulated wizard state for one user session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingState {
    pub current_step_index: usize,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub completed_step_ids: BTreeSet<String>,
    #[serde(default)]
    pub is_complete: bool,
}

impl OnboardingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &'static [StepDescriptor] {
        STEPS
    }

    pub fn total_steps(&self) -> usize {
        STEPS.len()
    }

    pub fn current_step(&self) -> &'static StepDescriptor {
        &STEPS[self.current_step_index.min(STEPS.len() - 1)]
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step_index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step_index + 1 >= STEPS.len()
    }

    /// Percentage of steps reached, counting the current one.
    pub fn progress_percent(&self) -> u8 {
        let reached = (self.current_step_index + 1).min(STEPS.len());
        u8::try_from(reached * 100 / STEPS.len()).unwrap_or(100)
    }

    /// Move forward one step. A no-op on the last step.
    ///
    /// The step being left is recorded as completed. Returns the new index.
    pub fn next_step(&mut self) -> usize {
        if !self.is_last_step() {
            self.completed_step_ids
                .insert(self.current_step().id.to_string());
            self.current_step_index += 1;
        }
        self.current_step_index
    }

    /// Move back one step. A no-op on the first step. Returns the new index.
    pub fn prev_step(&mut self) -> usize {
        self.current_step_index = self.current_step_index.saturating_sub(1);
        self.current_step_index
    }

    /// Validate the current step, then move forward.
    pub fn advance(&mut self) -> Result<usize, CoreError> {
        self.validate_current_step()?;
        Ok(self.next_step())
    }

    /// Shallow-merge `partial` into the accumulated answers. Later writes win.
    pub fn update_data(&mut self, partial: Map<String, Value>) {
        self.data.extend(partial);
    }

    /// Check the answers required to leave the current step.
    ///
    /// Only `profile-setup` (name and bio) and `preferences` (at least one
    /// goal) gate forward movement.
    pub fn validate_current_step(&self) -> Result<(), CoreError> {
        match self.current_step().id {
            STEP_PROFILE_SETUP => {
                if self.text(DATA_KEY_NAME).is_none() {
                    return Err(CoreError::Validation("Name is required".to_string()));
                }
                if self.text(DATA_KEY_BIO).is_none() {
                    return Err(CoreError::Validation("Bio is required".to_string()));
                }
                Ok(())
            }
            STEP_PREFERENCES => {
                if self.goals().is_empty() {
                    return Err(CoreError::Validation(
                        "Select at least one goal".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn can_proceed(&self) -> bool {
        self.validate_current_step().is_ok()
    }

    /// Assemble the profile payload from the accumulated answers.
    pub fn build_profile_draft(&self) -> ProfileDraft {
        ProfileDraft {
            display_name: self.text(DATA_KEY_NAME).unwrap_or_default(),
            bio: self.text(DATA_KEY_BIO).unwrap_or_default(),
            location: self.text(DATA_KEY_LOCATION),
            instagram: self.text(DATA_KEY_INSTAGRAM),
            goals: self.goals(),
            experience_level: self.text(DATA_KEY_EXPERIENCE_LEVEL),
        }
    }

    /// Mark every step completed and the wizard finished.
    pub fn mark_complete(&mut self) {
        self.completed_step_ids
            .extend(STEPS.iter().map(|s| s.id.to_string()));
        self.current_step_index = STEPS.len() - 1;
        self.is_complete = true;
    }

    /// A trimmed, non-empty string answer.
    fn text(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn goals(&self) -> Vec<String> {
        self.data
            .get(DATA_KEY_GOALS)
            .and_then(Value::as_array)
            .map(|goals| {
                goals
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|g| !g.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
