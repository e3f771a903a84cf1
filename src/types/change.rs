use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::bookmark::{Bookmark, BookmarkKey};
use super::errors::SubscriptionError;

pub const EVENT_INSERT: &str = "INSERT";
pub const EVENT_UPDATE: &str = "UPDATE";
pub const EVENT_DELETE: &str = "DELETE";

/// Untyped change notification as delivered by the change feed.
///
/// Row images are raw JSON. Nothing past the feed boundary should read them
/// directly; decode into a [`ChangeEvent`] first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangePayload {
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub table: String,
    #[serde(default)]
    pub new: Value,
    #[serde(default)]
    pub old: Value,
}

impl ChangePayload {
    pub fn insert(table: &str, row: &Bookmark) -> Self {
        Self {
            event_type: EVENT_INSERT.to_string(),
            table: table.to_string(),
            new: serde_json::to_value(row).unwrap_or(Value::Null),
            old: Value::Null,
        }
    }

    pub fn update(table: &str, old: &Bookmark, new: &Bookmark) -> Self {
        Self {
            event_type: EVENT_UPDATE.to_string(),
            table: table.to_string(),
            new: serde_json::to_value(new).unwrap_or(Value::Null),
            old: serde_json::to_value(BookmarkKey::from(old)).unwrap_or(Value::Null),
        }
    }

    pub fn delete(table: &str, old: &Bookmark) -> Self {
        Self {
            event_type: EVENT_DELETE.to_string(),
            table: table.to_string(),
            new: Value::Null,
            old: serde_json::to_value(BookmarkKey::from(old)).unwrap_or(Value::Null),
        }
    }
}

/// A change notification decoded into bookmark rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Insert(Bookmark),
    Update(Bookmark),
    Delete(BookmarkKey),
}

impl ChangeEvent {
    /// Decodes a raw feed payload.
    ///
    /// Unknown event types and row images that do not match the bookmark
    /// shape are reported as [`SubscriptionError::Decode`].
    pub fn decode(payload: &ChangePayload) -> Result<Self, SubscriptionError> {
        match payload.event_type.as_str() {
            EVENT_INSERT => Ok(ChangeEvent::Insert(decode_row(&payload.new, "new")?)),
            EVENT_UPDATE => Ok(ChangeEvent::Update(decode_row(&payload.new, "new")?)),
            EVENT_DELETE => Ok(ChangeEvent::Delete(decode_row(&payload.old, "old")?)),
            other => Err(SubscriptionError::Decode(format!(
                "unknown event type '{}'",
                other
            ))),
        }
    }

    /// Id of the row this event concerns.
    pub fn id(&self) -> &str {
        match self {
            ChangeEvent::Insert(row) | ChangeEvent::Update(row) => &row.id,
            ChangeEvent::Delete(key) => &key.id,
        }
    }

    /// Owner of the row, when the event carries it.
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            ChangeEvent::Insert(row) | ChangeEvent::Update(row) => Some(&row.owner_id),
            ChangeEvent::Delete(key) => key.owner_id.as_deref(),
        }
    }
}

fn decode_row<T: serde::de::DeserializeOwned>(value: &Value, image: &str) -> Result<T, SubscriptionError> {
    T::deserialize(value)
        .map_err(|e| SubscriptionError::Decode(format!("invalid '{}' row image: {}", image, e)))
}
