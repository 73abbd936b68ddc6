//! Well-known role name constants.
//!
//! These must match the `role` column values written at sign-in.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MODEL: &str = "model";
