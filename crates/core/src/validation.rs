//! Boundary validation helpers.
//!
//! Request DTOs derive [`validator::Validate`]; handlers call [`check`] so
//! every failure surfaces as [`CoreError::Validation`].

use validator::Validate;

use crate::error::CoreError;

/// Run `validator` rules on an input and convert failures to [`CoreError`].
pub fn check<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

/// Reject blank (empty or whitespace-only) required strings.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("'{field}' must not be empty")));
    }
    Ok(())
}
