/// Entity ids are opaque strings. Server-generated ids are UUID v7 so they
/// sort by creation time.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh, time-ordered entity id.
pub fn new_id() -> EntityId {
    uuid::Uuid::now_v7().to_string()
}
