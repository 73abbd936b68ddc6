//! Notification entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use swing_core::types::{new_id, EntityId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: EntityId,
    pub user_id: EntityId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn new(input: CreateNotification) -> Self {
        Self {
            id: new_id(),
            user_id: input.user_id,
            kind: input.kind,
            title: input.title,
            message: input.message,
            link: input.link,
            is_read: false,
            read_at: None,
            created_at: chrono::Utc::now(),
        }
    }
}

/// DTO for creating a notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: EntityId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}
