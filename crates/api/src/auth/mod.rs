//! Authentication primitives.
//!
//! - [`identity`]: verifies third-party sign-in credentials.
//! - [`jwt`]: session token generation and validation.

pub mod identity;
pub mod jwt;
