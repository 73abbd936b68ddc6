//! Event type and notification kind names.

pub const EVENT_VOTE_CAST: &str = "vote.cast";
pub const EVENT_COMPETITION_JOINED: &str = "competition.joined";
pub const EVENT_COMPETITION_WITHDRAWN: &str = "competition.withdrawn";
pub const EVENT_PROFILE_CREATED: &str = "profile.created";

pub const KIND_VOTE: &str = "vote";
pub const KIND_COMPETITION: &str = "competition";
pub const KIND_SYSTEM: &str = "system";
