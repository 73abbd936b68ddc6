//! Registration status values.
//!
//! Registrations are never hard-deleted; withdrawing flips the status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status values for a model's registration in a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Active,
    Withdrawn,
}

impl RegistrationStatus {
    /// Parse a status string from storage.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(CoreError::Validation(format!(
                "Invalid registration status '{s}'. Must be one of: active, withdrawn"
            ))),
        }
    }

    /// Convert to a storage-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Withdrawn => "withdrawn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [RegistrationStatus::Active, RegistrationStatus::Withdrawn] {
            assert_eq!(RegistrationStatus::from_str_db(status.as_str()).unwrap(), status);
        }
        assert!(RegistrationStatus::from_str_db("deleted").is_err());
    }
}
