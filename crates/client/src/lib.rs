//! Client-side state for the Swing Boudoir showcase.
//!
//! A local key/value store stands in for browser storage. On top of it sit
//! typed cache collections, the onboarding sequencer and the free-vote
//! tracker. [`ApiClient`] talks to the REST API.

pub mod api;
pub mod cache;
pub mod error;
pub mod models;
pub mod onboarding;
pub mod store;
pub mod vote_tracker;

pub use api::ApiClient;
pub use cache::{CacheEvent, ClientCache};
pub use error::{ClientError, ClientResult};
pub use onboarding::{OnboardingSequencer, ProfileApi};
pub use store::{LocalStore, StorageEvent};
pub use vote_tracker::VoteTracker;
