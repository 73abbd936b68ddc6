//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the stored row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - A filter struct used by `list` queries, where the entity has one

pub mod competition;
pub mod notification;
pub mod prize;
pub mod registration;
pub mod user;
pub mod vote;
