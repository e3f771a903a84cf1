//! Property-based tests for change-event idempotence.
//!
//! Delivering any change event a second time must leave the list exactly as
//! the first delivery left it, whatever the starting list looks like.

use std::sync::Arc;

use proptest::prelude::*;
use smart_bookmarks::managers::bookmark_store::SqliteBookmarkStore;
use smart_bookmarks::managers::reconciler::BookmarkReconciler;
use smart_bookmarks::types::bookmark::{Bookmark, BookmarkKey};
use smart_bookmarks::types::change::ChangeEvent;

const OWNER: &str = "owner-1";

/// Small id space so events often hit rows already in the list.
fn arb_bookmark() -> impl Strategy<Value = Bookmark> {
    (0u8..6, 0i64..50, "[a-z]{1,8}").prop_map(|(n, created_at, title)| Bookmark {
        id: format!("b{}", n),
        created_at,
        owner_id: OWNER.to_string(),
        url: format!("https://{}.com", title),
        title,
    })
}

fn arb_event() -> impl Strategy<Value = ChangeEvent> {
    prop_oneof![
        arb_bookmark().prop_map(ChangeEvent::Insert),
        arb_bookmark().prop_map(ChangeEvent::Update),
        (0u8..6).prop_map(|n| ChangeEvent::Delete(BookmarkKey {
            id: format!("b{}", n),
            owner_id: None,
        })),
    ]
}

fn loaded_reconciler() -> BookmarkReconciler<SqliteBookmarkStore> {
    let store = Arc::new(SqliteBookmarkStore::open_in_memory().expect("Failed to open store"));
    let mut rec = BookmarkReconciler::new(store);
    rec.initialize(OWNER).expect("empty store should load");
    rec
}

// *For any* history of events and any final event, applying the final event
// twice SHALL produce the same list as applying it once, and the second
// application SHALL report no change.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repeated_event_is_noop(
        history in prop::collection::vec(arb_event(), 0..20),
        event in arb_event(),
    ) {
        let mut rec = loaded_reconciler();
        for e in history {
            rec.on_change_event(e);
        }

        rec.on_change_event(event.clone());
        let once = rec.records().to_vec();
        let changed = rec.on_change_event(event);

        prop_assert!(!changed, "second delivery reported a change");
        prop_assert_eq!(rec.records(), once.as_slice());
    }

    #[test]
    fn ids_stay_unique(events in prop::collection::vec(arb_event(), 0..40)) {
        let mut rec = loaded_reconciler();
        for e in events {
            rec.on_change_event(e);
        }

        let mut ids: Vec<&str> = rec.records().iter().map(|b| b.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }
}
