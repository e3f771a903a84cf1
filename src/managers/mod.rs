// Smart Bookmarks state managers
// Managers own stateful pieces: the store boundary, its change feed, the auth session, and the per-tab reconciler.

pub mod auth_session;
pub mod bookmark_store;
pub mod change_feed;
pub mod reconciler;
