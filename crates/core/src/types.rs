/// Record identifiers are UUID v7 so they sort by creation time in every store.
pub type DbId = uuid::Uuid;

/// Subject identifier issued by the external auth provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Allocate a new record identifier.
pub fn new_id() -> DbId {
    uuid::Uuid::now_v7()
}
