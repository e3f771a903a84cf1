//! Unit tests for the SQLite bookmark store and its change feed.
//!
//! Every operation is owner-scoped; these tests check the scoping and the
//! payloads published for each committed write.

use smart_bookmarks::managers::bookmark_store::{BookmarkStoreTrait, SqliteBookmarkStore, BOOKMARKS_TABLE};
use smart_bookmarks::types::change::ChangeEvent;
use smart_bookmarks::types::errors::StoreError;

fn store() -> SqliteBookmarkStore {
    SqliteBookmarkStore::open_in_memory().expect("Failed to open in-memory store")
}

/// `fetch_all` returns only the caller's rows, newest first.
#[test]
fn test_fetch_all_is_owner_scoped_and_newest_first() {
    let store = store();
    let first = store.insert("u1", "https://a.com", "A").unwrap();
    let _foreign = store.insert("u2", "https://x.com", "X").unwrap();
    let second = store.insert("u1", "https://b.com", "B").unwrap();

    let rows = store.fetch_all("u1").unwrap();
    let ids: Vec<&str> = rows.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    assert!(rows.iter().all(|b| b.owner_id == "u1"));
}

/// The store assigns ids and timestamps.
#[test]
fn test_insert_assigns_id_and_created_at() {
    let store = store();
    let a = store.insert("u1", "https://a.com", "A").unwrap();
    let b = store.insert("u1", "https://b.com", "B").unwrap();

    assert_ne!(a.id, b.id);
    assert!(a.created_at > 0);
    assert!(b.created_at >= a.created_at);
}

/// Update publishes the new row image and keeps `created_at`.
#[test]
fn test_update_publishes_new_row() {
    let store = store();
    let original = store.insert("u1", "https://a.com", "A").unwrap();
    let mut sub = store.subscribe_changes("u1", BOOKMARKS_TABLE).unwrap();

    let updated = store
        .update(&original.id, "u1", "https://a.org", "A (moved)")
        .unwrap();
    assert_eq!(updated.created_at, original.created_at);

    let payload = sub.try_next().unwrap().expect("update should be published");
    assert_eq!(ChangeEvent::decode(&payload).unwrap(), ChangeEvent::Update(updated));
}

/// Updating a row owned by someone else behaves like updating a missing row.
#[test]
fn test_update_foreign_row_not_found() {
    let store = store();
    let row = store.insert("u1", "https://a.com", "A").unwrap();

    assert_eq!(
        store.update(&row.id, "u2", "https://evil.com", "Evil"),
        Err(StoreError::NotFound(row.id.clone()))
    );
    assert_eq!(store.fetch_all("u1").unwrap()[0].url, "https://a.com");
}

/// Delete removes the row and publishes a DELETE carrying its id.
#[test]
fn test_delete_publishes_key() {
    let store = store();
    let row = store.insert("u1", "https://a.com", "A").unwrap();
    let mut sub = store.subscribe_changes("u1", BOOKMARKS_TABLE).unwrap();

    store.delete(&row.id, "u1").unwrap();

    assert!(store.fetch_all("u1").unwrap().is_empty());
    let payload = sub.try_next().unwrap().expect("delete should be published");
    let event = ChangeEvent::decode(&payload).unwrap();
    assert!(matches!(event, ChangeEvent::Delete(ref key) if key.id == row.id));
}

/// Deleting something that is not there succeeds and publishes nothing.
#[test]
fn test_delete_missing_row_is_noop() {
    let store = store();
    let mut sub = store.subscribe_changes("u1", BOOKMARKS_TABLE).unwrap();

    store.delete("no-such-id", "u1").unwrap();

    assert!(sub.try_next().unwrap().is_none());
}

/// Every live subscriber for the owner receives its own copy.
#[test]
fn test_feed_fans_out_to_every_tab() {
    let store = store();
    let mut tab_a = store.subscribe_changes("u1", BOOKMARKS_TABLE).unwrap();
    let mut tab_b = store.subscribe_changes("u1", BOOKMARKS_TABLE).unwrap();
    assert_eq!(store.feed().live_count(), 2);

    store.insert("u1", "https://a.com", "A").unwrap();

    assert!(tab_a.try_next().unwrap().is_some());
    assert!(tab_b.try_next().unwrap().is_some());

    drop(tab_a);
    tab_b.release();
    assert_eq!(store.feed().live_count(), 0);
}
