//! Voting policy: free-vote cooldown, premium packages and leaderboard
//! ranking.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Hours a voter must wait between free votes for the same model.
pub const FREE_VOTE_COOLDOWN_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Free-vote eligibility
// ---------------------------------------------------------------------------

/// Result of a free-vote eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteEligibility {
    pub can_vote: bool,
    /// Whole hours until the next free vote, rounded up. Zero when allowed.
    pub hours_remaining: i64,
    pub last_vote_at: Option<Timestamp>,
    pub next_vote_at: Option<Timestamp>,
}

/// Decide whether a free vote is allowed given the last free vote time.
///
/// No prior vote, or a prior vote at least [`FREE_VOTE_COOLDOWN_HOURS`] ago,
/// allows voting.
pub fn free_vote_eligibility(last_vote_at: Option<Timestamp>, now: Timestamp) -> VoteEligibility {
    let Some(last) = last_vote_at else {
        return VoteEligibility {
            can_vote: true,
            hours_remaining: 0,
            last_vote_at: None,
            next_vote_at: None,
        };
    };

    let next = last + Duration::hours(FREE_VOTE_COOLDOWN_HOURS);
    let remaining_secs = (next - now).num_seconds();
    if remaining_secs <= 0 {
        return VoteEligibility {
            can_vote: true,
            hours_remaining: 0,
            last_vote_at: Some(last),
            next_vote_at: Some(next),
        };
    }

    VoteEligibility {
        can_vote: false,
        hours_remaining: (remaining_secs + 3599) / 3600,
        last_vote_at: Some(last),
        next_vote_at: Some(next),
    }
}

/// Shorthand for `free_vote_eligibility(..).can_vote`.
pub fn can_vote(last_vote_at: Option<Timestamp>, now: Timestamp) -> bool {
    free_vote_eligibility(last_vote_at, now).can_vote
}

// ---------------------------------------------------------------------------
// Premium packages
// ---------------------------------------------------------------------------

/// A purchasable bundle of premium votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePackage {
    pub id: &'static str,
    pub name: &'static str,
    pub votes: u32,
    pub price_cents: u32,
}

/// Premium vote packages offered to voters.
pub const VOTE_PACKAGES: &[VotePackage] = &[
    VotePackage {
        id: "starter",
        name: "Starter",
        votes: 5,
        price_cents: 499,
    },
    VotePackage {
        id: "supporter",
        name: "Supporter",
        votes: 15,
        price_cents: 1299,
    },
    VotePackage {
        id: "superfan",
        name: "Superfan",
        votes: 50,
        price_cents: 3999,
    },
];

/// Look up a premium package by id.
pub fn find_package(id: &str) -> Result<&'static VotePackage, CoreError> {
    VOTE_PACKAGES
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| CoreError::Validation(format!("Unknown vote package '{id}'")))
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Standard competition ranking ("1224") by votes, highest first.
///
/// Returns one rank per input entry, in input order. Entries with equal
/// votes share a rank and the following rank is skipped.
pub fn competition_ranks(votes: &[i64]) -> Vec<i32> {
    let mut sorted = votes.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    votes
        .iter()
        .map(|v| {
            let ahead = sorted.partition_point(|other| other > v);
            i32::try_from(ahead).unwrap_or(i32::MAX - 1) + 1
        })
        .collect()
}
