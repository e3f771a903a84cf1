//! Unit tests for the database layer (connection + migrations).

use smart_bookmarks::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use smart_bookmarks::database::Database;

#[test]
fn test_open_in_memory_succeeds() {
    assert!(Database::open_in_memory().is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_bookmarks_table_and_index() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for (kind, name) in [("table", "bookmarks"), ("index", "idx_bookmarks_user_created")] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = ?1 AND name = ?2",
                [kind, name],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "{} '{}' should exist after migrations", kind, name);
    }
}

#[test]
fn test_schema_version_recorded_and_migrations_idempotent() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);

    run_all(db.connection()).expect("second run should be a no-op");
    let rows: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_blank_url_violates_check_constraint() {
    let db = Database::open_in_memory().unwrap();
    let result = db.connection().execute(
        "INSERT INTO bookmarks (id, created_at, user_id, url, title) VALUES ('x', 1, 'u', '', 't')",
        [],
    );
    assert!(result.is_err(), "empty url must be rejected by the schema");
}

#[test]
fn test_file_database_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO bookmarks (id, created_at, user_id, url, title) \
                 VALUES ('x', 1, 'u', 'https://a.com', 'A')",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
