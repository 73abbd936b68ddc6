//! Domain rules for the Swing Boudoir showcase.
//!
//! Everything in this crate is pure: status enums, validation helpers and
//! the policy functions (vote cooldown, leaderboard ranking, onboarding step
//! machine) shared by the server and the client library.

pub mod competition;
pub mod error;
pub mod events;
pub mod onboarding;
pub mod profile;
pub mod registration;
pub mod roles;
pub mod types;
pub mod uploads;
pub mod validation;
pub mod voting;
