use serde::{Deserialize, Serialize};

/// A saved bookmark as stored by the remote store.
///
/// `owner_id` travels as `user_id` on the wire, which is the column name the
/// hosted table uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    pub id: String,
    pub created_at: i64,
    #[serde(rename = "user_id", alias = "owner_id")]
    pub owner_id: String,
    pub url: String,
    pub title: String,
}

/// The identifying part of a removed row.
///
/// Delete notifications only guarantee the primary key; the remaining
/// columns are kept when the store happens to send them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkKey {
    pub id: String,
    #[serde(default, rename = "user_id", alias = "owner_id")]
    pub owner_id: Option<String>,
}

impl From<&Bookmark> for BookmarkKey {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id.clone(),
            owner_id: Some(bookmark.owner_id.clone()),
        }
    }
}

/// Values submitted from the add-bookmark form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkDraft {
    pub url: String,
    pub title: String,
}

impl BookmarkDraft {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// Returns the trimmed `(url, title)` pair, or `None` if either is blank.
    pub fn normalized(&self) -> Option<(&str, &str)> {
        let url = self.url.trim();
        let title = self.title.trim();
        if url.is_empty() || title.is_empty() {
            None
        } else {
            Some((url, title))
        }
    }
}
