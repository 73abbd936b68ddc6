//! Competition lifecycle rules.
//!
//! Competitions move through `coming-soon -> active -> ended`. Legacy status
//! spellings (`inactive`, `completed`) are accepted on input and normalised.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status values for a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompetitionStatus {
    Active,
    #[serde(alias = "inactive")]
    ComingSoon,
    #[serde(alias = "completed")]
    Ended,
}

impl CompetitionStatus {
    /// Parse a status string from storage or a request.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "coming-soon" | "inactive" => Ok(Self::ComingSoon),
            "ended" | "completed" => Ok(Self::Ended),
            _ => Err(CoreError::Validation(format!(
                "Invalid competition status '{s}'. Must be one of: active, coming-soon, ended"
            ))),
        }
    }

    /// Canonical storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ComingSoon => "coming-soon",
            Self::Ended => "ended",
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A competition is listed as available while it is active and its end date
/// has not passed.
pub fn is_available(status: &str, end_date: Timestamp, now: Timestamp) -> bool {
    matches!(
        CompetitionStatus::from_str_db(status),
        Ok(CompetitionStatus::Active)
    ) && end_date > now
}

/// Validate that a competition's date window is well-formed.
pub fn validate_dates(start_date: Timestamp, end_date: Timestamp) -> Result<(), CoreError> {
    if end_date <= start_date {
        return Err(CoreError::Validation(
            "Competition end date must be after its start date".to_string(),
        ));
    }
    Ok(())
}

/// Check whether a new participant may join.
///
/// The competition must be available and, when a participant cap is set,
/// not yet full.
pub fn check_joinable(
    status: &str,
    end_date: Timestamp,
    now: Timestamp,
    active_participants: i64,
    max_participants: Option<i32>,
) -> Result<(), CoreError> {
    if !is_available(status, end_date, now) {
        return Err(CoreError::Validation(
            "Competition is not open for registration".to_string(),
        ));
    }
    if let Some(max) = max_participants {
        if active_participants >= i64::from(max) {
            return Err(CoreError::Validation(format!(
                "Competition is full ({max} participants)"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn status_accepts_legacy_spellings() {
        assert_eq!(
            CompetitionStatus::from_str_db("inactive").unwrap(),
            CompetitionStatus::ComingSoon
        );
        assert_eq!(
            CompetitionStatus::from_str_db("completed").unwrap(),
            CompetitionStatus::Ended
        );
        assert!(CompetitionStatus::from_str_db("paused").is_err());
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_value(CompetitionStatus::ComingSoon).unwrap();
        assert_eq!(json, "coming-soon");
        let parsed: CompetitionStatus = serde_json::from_value("completed".into()).unwrap();
        assert_eq!(parsed, CompetitionStatus::Ended);
    }

    #[test]
    fn available_requires_active_and_future_end() {
        let now = Utc::now();
        assert!(is_available("active", now + Duration::days(1), now));
        assert!(!is_available("active", now - Duration::seconds(1), now));
        assert!(!is_available("coming-soon", now + Duration::days(1), now));
        assert!(!is_available("ended", now + Duration::days(1), now));
    }

    #[test]
    fn dates_must_be_ordered() {
        let now = Utc::now();
        assert!(validate_dates(now, now + Duration::days(7)).is_ok());
        assert!(validate_dates(now, now).is_err());
    }

    #[test]
    fn full_competition_rejects_join() {
        let now = Utc::now();
        let end = now + Duration::days(3);
        assert!(check_joinable("active", end, now, 1, Some(2)).is_ok());
        assert!(check_joinable("active", end, now, 2, Some(2)).is_err());
        assert!(check_joinable("active", end, now, 500, None).is_ok());
        assert!(check_joinable("ended", end, now, 0, None).is_err());
    }
}
