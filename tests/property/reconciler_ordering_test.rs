//! Property-based tests for reconciler ordering and convergence.
//!
//! Inserts may arrive in any order, before or after the snapshot; the list
//! must always end up newest first with every row exactly once.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use smart_bookmarks::managers::bookmark_store::{BookmarkStoreTrait, SqliteBookmarkStore};
use smart_bookmarks::managers::reconciler::BookmarkReconciler;
use smart_bookmarks::types::bookmark::Bookmark;
use smart_bookmarks::types::change::ChangeEvent;

const OWNER: &str = "owner-1";

/// Rows with unique ids and arbitrary (possibly equal) timestamps.
fn arb_rows() -> impl Strategy<Value = Vec<Bookmark>> {
    prop::collection::vec(0i64..20, 1..15).prop_map(|stamps| {
        stamps
            .into_iter()
            .enumerate()
            .map(|(i, created_at)| Bookmark {
                id: format!("b{}", i),
                created_at,
                owner_id: OWNER.to_string(),
                url: format!("https://site{}.com", i),
                title: format!("Site {}", i),
            })
            .collect()
    })
}

/// Rows plus a shuffled delivery order.
fn arb_rows_shuffled() -> impl Strategy<Value = (Vec<Bookmark>, Vec<Bookmark>)> {
    arb_rows().prop_flat_map(|rows| {
        let shuffled = Just(rows.clone()).prop_shuffle();
        (Just(rows), shuffled)
    })
}

fn reconciler() -> BookmarkReconciler<SqliteBookmarkStore> {
    let store = Arc::new(SqliteBookmarkStore::open_in_memory().expect("Failed to open store"));
    BookmarkReconciler::new(store)
}

fn assert_newest_first(records: &[Bookmark]) -> Result<(), TestCaseError> {
    for pair in records.windows(2) {
        prop_assert!(
            pair[0].created_at >= pair[1].created_at,
            "{} ({}) listed before {} ({})",
            pair[0].id,
            pair[0].created_at,
            pair[1].id,
            pair[1].created_at
        );
    }
    Ok(())
}

fn id_set(records: &[Bookmark]) -> BTreeSet<String> {
    records.iter().map(|b| b.id.clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // *For any* delivery order of inserts, the list SHALL be sorted by
    // created_at descending and contain each row once.
    #[test]
    fn inserts_in_any_order_sorted_desc((rows, delivery) in arb_rows_shuffled()) {
        let mut rec = reconciler();
        rec.initialize(OWNER).expect("empty store should load");

        for row in delivery.iter().chain(delivery.iter()) {
            rec.on_change_event(ChangeEvent::Insert(row.clone()));
        }

        prop_assert_eq!(rec.len(), rows.len());
        prop_assert_eq!(id_set(rec.records()), id_set(&rows));
        assert_newest_first(rec.records())?;
    }

    // *For any* split of rows into "committed before the fetch" and "seen as
    // events before the fetch", the list after initialize SHALL equal the
    // list built from the snapshot alone once all events are delivered.
    #[test]
    fn early_events_converge_with_snapshot(
        titles in prop::collection::vec("[a-z]{1,10}", 1..10),
        early in prop::collection::vec(any::<bool>(), 10),
    ) {
        let store = Arc::new(SqliteBookmarkStore::open_in_memory().expect("Failed to open store"));
        let mut rec = BookmarkReconciler::new(store.clone());
        rec.subscribe(OWNER).expect("subscribe should succeed");

        let mut inserted = Vec::new();
        for title in &titles {
            inserted.push(store.insert(OWNER, "https://example.com", title).expect("insert"));
        }
        for (row, deliver_early) in inserted.iter().zip(early.iter()) {
            if *deliver_early {
                rec.on_change_event(ChangeEvent::Insert(row.clone()));
            }
        }

        rec.initialize(OWNER).expect("initialize");
        prop_assert!(rec.process_pending().is_clean());

        let expected = store.fetch_all(OWNER).expect("fetch");
        prop_assert_eq!(id_set(rec.records()), id_set(&expected));
        prop_assert_eq!(rec.len(), expected.len());
        assert_newest_first(rec.records())?;
    }
}
