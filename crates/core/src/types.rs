/// Record identifiers are opaque strings assigned by the catalog API.
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Uninterpreted record fields (name, description, images, ...).
pub type Payload = serde_json::Map<String, serde_json::Value>;
