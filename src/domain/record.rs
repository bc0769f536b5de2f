use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw account snapshot as supplied by the caller.
///
/// The record has no fixed shape. Known keys are listed in [`keys`]; any of
/// them may be missing or carry an unexpected type. Interpretation and
/// defaulting happen in the feature extractor only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountRecord(Map<String, Value>);

/// Documented record keys.
pub mod keys {
    pub const USERNAME: &str = "username";
    pub const CREATED_AT: &str = "created_at";
    pub const HAS_PROFILE_IMAGE: &str = "has_profile_image";
    pub const BIO: &str = "bio";
    pub const VERIFIED: &str = "verified";
    pub const POST_COUNT: &str = "post_count";
    pub const FOLLOWER_COUNT: &str = "follower_count";
    pub const FOLLOWING_COUNT: &str = "following_count";
    pub const RECENT_POSTS: &str = "recent_posts";
    pub const AVG_REPLY_TIME_SECONDS: &str = "avg_reply_time_seconds";
    pub const INTERACTIONS: &str = "interactions";

    /// Keys inside each `recent_posts` entry.
    pub const POST_CONTENT: &str = "content";
    pub const POST_TIMESTAMP: &str = "timestamp";
}

impl AccountRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        AccountRecord(Map::new())
    }

    /// Wrap an arbitrary JSON value. Non-object values become an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => AccountRecord(map),
            _ => AccountRecord::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Username if present and a string.
    pub fn username(&self) -> Option<&str> {
        self.0.get(keys::USERNAME).and_then(Value::as_str)
    }

    /// Underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for AccountRecord {
    fn from(map: Map<String, Value>) -> Self {
        AccountRecord(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserialization() {
        let json = r#"{
            "username": "jane",
            "follower_count": 12,
            "recent_posts": [{"content": "hi", "timestamp": "2024-01-01T00:00:00Z"}],
            "unexpected": {"nested": true}
        }"#;

        let record: AccountRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.username(), Some("jane"));
        assert_eq!(record.get(keys::FOLLOWER_COUNT), Some(&json!(12)));
        assert!(record.get("unexpected").is_some());
    }

    #[test]
    fn test_non_object_value_becomes_empty() {
        let record = AccountRecord::from_value(json!([1, 2, 3]));
        assert!(record.as_map().is_empty());
        assert_eq!(record.username(), None);
    }

    #[test]
    fn test_username_must_be_string() {
        let record = AccountRecord::new().with(keys::USERNAME, 42);
        assert_eq!(record.username(), None);
    }
}
