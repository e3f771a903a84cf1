//! Bookmark store boundary.
//!
//! [`BookmarkStoreTrait`] is everything the reconciler needs from the remote
//! data store: owner-scoped reads and writes plus a change feed.
//! [`SqliteBookmarkStore`] implements it over SQLite via `rusqlite`, publishing
//! every committed write to a [`ChangeFeed`].

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::managers::change_feed::{ChangeFeed, Subscription};
use crate::types::bookmark::Bookmark;
use crate::types::change::ChangePayload;
use crate::types::errors::{StoreError, SubscriptionError};

/// Name of the table the store publishes changes for.
pub const BOOKMARKS_TABLE: &str = "bookmarks";

/// Operations of the remote bookmark store. Every call is scoped by owner.
pub trait BookmarkStoreTrait {
    /// All rows owned by `owner_id`, newest first.
    fn fetch_all(&self, owner_id: &str) -> Result<Vec<Bookmark>, StoreError>;
    /// Creates a row; the store assigns `id` and `created_at`.
    fn insert(&self, owner_id: &str, url: &str, title: &str) -> Result<Bookmark, StoreError>;
    fn update(&self, id: &str, owner_id: &str, url: &str, title: &str) -> Result<Bookmark, StoreError>;
    /// Removes the row if `owner_id` owns it. Absent rows are not an error.
    fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError>;
    fn subscribe_changes(&self, owner_id: &str, table: &str) -> Result<Subscription, SubscriptionError>;
}

/// Bookmark store backed by a SQLite database and an in-process change feed.
pub struct SqliteBookmarkStore {
    db: Mutex<Database>,
    feed: ChangeFeed,
}

impl SqliteBookmarkStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            feed: ChangeFeed::new(),
        }
    }

    /// Store over a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// The feed this store publishes to.
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let db = self
            .db
            .lock()
            .map_err(|_| StoreError::DatabaseError("database lock poisoned".to_string()))?;
        f(&db)
    }

    fn validate(url: &str, title: &str) -> Result<(), StoreError> {
        if url.trim().is_empty() {
            return Err(StoreError::Rejected("url must not be empty".to_string()));
        }
        if title.trim().is_empty() {
            return Err(StoreError::Rejected("title must not be empty".to_string()));
        }
        Ok(())
    }

    fn find_owned(db: &Database, id: &str, owner_id: &str) -> Result<Option<Bookmark>, StoreError> {
        let row = db
            .connection()
            .query_row(
                "SELECT id, created_at, user_id, url, title FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, owner_id],
                Self::row_to_bookmark,
            )
            .optional()?;
        Ok(row)
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            created_at: row.get(1)?,
            owner_id: row.get(2)?,
            url: row.get(3)?,
            title: row.get(4)?,
        })
    }
}

impl BookmarkStoreTrait for SqliteBookmarkStore {
    fn fetch_all(&self, owner_id: &str) -> Result<Vec<Bookmark>, StoreError> {
        self.with_db(|db| {
            let mut stmt = db.connection().prepare(
                "SELECT id, created_at, user_id, url, title FROM bookmarks \
                 WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![owner_id], Self::row_to_bookmark)?;

            let mut results = Vec::new();
            for row in rows {
                results.push(row?);
            }
            debug!(owner_id, count = results.len(), "fetched bookmarks");
            Ok(results)
        })
    }

    fn insert(&self, owner_id: &str, url: &str, title: &str) -> Result<Bookmark, StoreError> {
        Self::validate(url, title)?;

        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            created_at: Self::now(),
            owner_id: owner_id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
        };

        self.with_db(|db| {
            db.connection().execute(
                "INSERT INTO bookmarks (id, created_at, user_id, url, title) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![bookmark.id, bookmark.created_at, bookmark.owner_id, bookmark.url, bookmark.title],
            )?;
            Ok(())
        })?;

        self.feed.publish(owner_id, BOOKMARKS_TABLE, &ChangePayload::insert(BOOKMARKS_TABLE, &bookmark));
        Ok(bookmark)
    }

    fn update(&self, id: &str, owner_id: &str, url: &str, title: &str) -> Result<Bookmark, StoreError> {
        Self::validate(url, title)?;

        let (old, new) = self.with_db(|db| {
            let old = Self::find_owned(db, id, owner_id)?
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            db.connection().execute(
                "UPDATE bookmarks SET url = ?1, title = ?2 WHERE id = ?3 AND user_id = ?4",
                params![url, title, id, owner_id],
            )?;
            let new = Bookmark {
                url: url.to_string(),
                title: title.to_string(),
                ..old.clone()
            };
            Ok((old, new))
        })?;

        self.feed.publish(owner_id, BOOKMARKS_TABLE, &ChangePayload::update(BOOKMARKS_TABLE, &old, &new));
        Ok(new)
    }

    fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let removed = self.with_db(|db| {
            let Some(old) = Self::find_owned(db, id, owner_id)? else {
                return Ok(None);
            };
            let affected = db.connection().execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, owner_id],
            )?;
            Ok((affected > 0).then_some(old))
        })?;

        match removed {
            Some(old) => {
                self.feed.publish(owner_id, BOOKMARKS_TABLE, &ChangePayload::delete(BOOKMARKS_TABLE, &old));
            }
            None => debug!(id, owner_id, "delete matched no owned row"),
        }
        Ok(())
    }

    fn subscribe_changes(&self, owner_id: &str, table: &str) -> Result<Subscription, SubscriptionError> {
        if table != BOOKMARKS_TABLE {
            warn!(table, "subscription requested for unknown table");
            return Err(SubscriptionError::UnknownTable(table.to_string()));
        }
        Ok(self.feed.register(owner_id, table))
    }
}
