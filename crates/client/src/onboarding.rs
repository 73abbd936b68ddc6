//! Onboarding wizard session.
//!
//! Wraps the step machine from `swing_core::onboarding` with persistence:
//! the state is written under `onboarding_<userId>` after every mutation
//! and removed once onboarding completes.

use async_trait::async_trait;
use serde_json::{Map, Value};
use swing_core::error::CoreError;
use swing_core::onboarding::{storage_key, OnboardingState, StepDescriptor};
use swing_core::profile::{Profile, ProfileDraft};

use crate::error::ClientResult;
use crate::models::{User, UserUpdate};
use crate::store::LocalStore;

/// The remote calls onboarding completion needs.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn create_profile(&self, draft: &ProfileDraft) -> ClientResult<Profile>;
    async fn update_user(&self, update: &UserUpdate) -> ClientResult<User>;
}

pub struct OnboardingSequencer {
    store: LocalStore,
    user_id: String,
    state: OnboardingState,
}

impl OnboardingSequencer {
    /// Resume the user's saved session, or start a fresh one.
    pub async fn load(store: LocalStore, user_id: impl Into<String>) -> ClientResult<Self> {
        let user_id = user_id.into();
        let state = store
            .get_json(&storage_key(&user_id))
            .await?
            .unwrap_or_default();
        Ok(Self {
            store,
            user_id,
            state,
        })
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn current_step(&self) -> &'static StepDescriptor {
        self.state.current_step()
    }

    pub fn progress(&self) -> u8 {
        self.state.progress_percent()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    /// Shallow-merge answers. No validation.
    pub async fn update_data(&mut self, partial: Map<String, Value>) -> ClientResult<()> {
        self.state.update_data(partial);
        self.persist().await
    }

    /// Move forward one step; silent no-op on the last step.
    pub async fn next_step(&mut self) -> ClientResult<usize> {
        let index = self.state.next_step();
        self.persist().await?;
        Ok(index)
    }

    /// Move back one step; silent no-op on the first step.
    pub async fn prev_step(&mut self) -> ClientResult<usize> {
        let index = self.state.prev_step();
        self.persist().await?;
        Ok(index)
    }

    pub fn validate_current_step(&self) -> Result<(), CoreError> {
        self.state.validate_current_step()
    }

    pub fn can_proceed(&self) -> bool {
        self.state.can_proceed()
    }

    /// Create the profile from the collected answers and finish onboarding.
    ///
    /// A failed profile creation returns the error with the state
    /// untouched. A failed user update afterwards is logged and ignored.
    pub async fn complete(&mut self, api: &dyn ProfileApi) -> ClientResult<Profile> {
        let draft = self.state.build_profile_draft();
        let profile = api.create_profile(&draft).await?;

        if let Err(e) = api.update_user(&UserUpdate::onboarding_completed()).await {
            tracing::warn!(
                user_id = %self.user_id,
                error = %e,
                "Failed to mark onboarding complete on the user record"
            );
        }

        self.state.mark_complete();
        self.store.remove(&storage_key(&self.user_id)).await?;
        tracing::info!(user_id = %self.user_id, "Onboarding completed");
        Ok(profile)
    }

    async fn persist(&self) -> ClientResult<()> {
        self.store
            .set_json(&storage_key(&self.user_id), &self.state)
            .await
    }
}
