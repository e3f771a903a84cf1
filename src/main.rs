//! Smart Bookmarks: a personal bookmark manager with real-time sync across tabs.
//!
//! Entry point: loads settings, installs logging, and runs a console walkthrough
//! of two dashboard tabs sharing one bookmark store. Pass `--persist` to use the
//! configured database file instead of an in-memory one.

use std::sync::Arc;

use smart_bookmarks::database::Database;
use smart_bookmarks::dashboard::Dashboard;
use smart_bookmarks::managers::auth_session::{AuthSession, AuthSessionTrait};
use smart_bookmarks::managers::bookmark_store::SqliteBookmarkStore;
use smart_bookmarks::routes::{RouteGuard, DASHBOARD_PATH, HOME_PATH};
use smart_bookmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use smart_bookmarks::types::bookmark::BookmarkDraft;
use smart_bookmarks::types::session::User;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings_engine = SettingsEngine::new(std::env::var("SMART_BOOKMARKS_CONFIG").ok());
    let load_result = settings_engine.load();
    let settings = settings_engine.get_settings().clone();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = load_result {
        warn!(error = %e, "settings unreadable, continuing with defaults");
    }

    let persist = std::env::args().any(|arg| arg == "--persist");
    let db = if persist {
        let path = settings_engine.database_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Database::open(&path)?
    } else {
        Database::open_in_memory()?
    };
    let store = Arc::new(SqliteBookmarkStore::new(db));
    let session = AuthSession::new();
    let guard = RouteGuard::from_settings(&settings.auth);

    println!();
    println!(
        "Smart Bookmarks v{} (channel: {})",
        env!("CARGO_PKG_VERSION"),
        settings.realtime.channel
    );
    println!();

    section("Routes (signed out)");
    for path in [HOME_PATH, DASHBOARD_PATH, guard.callback_path()] {
        println!("  {:<16} -> {:?}", path, guard.decide(path, session.is_signed_in()));
    }
    let request = guard.sign_in_request("http://localhost:3000");
    println!("  Sign in with {} -> {}", request.provider, request.redirect_to);

    let mut tab_a = Dashboard::new(store.clone(), session.subscribe());
    let mut tab_b = Dashboard::new(store.clone(), session.subscribe());

    section("Sign in");
    session.sign_in(User {
        id: "demo-user".to_string(),
        email: Some("demo@example.com".to_string()),
        full_name: None,
    });
    tab_a.sync_auth();
    tab_b.sync_auth();
    println!("  Signed in as {}", tab_a.user().map(|u| u.display_name()).unwrap_or("?"));
    println!("  Live subscriptions: {}", store.feed().live_count());
    for path in [HOME_PATH, DASHBOARD_PATH] {
        println!("  {:<16} -> {:?}", path, guard.decide(path, session.is_signed_in()));
    }

    section("Add from tab A");
    tab_a.add_bookmark(&BookmarkDraft::new("https://www.rust-lang.org", "Rust"));
    tab_a.add_bookmark(&BookmarkDraft::new("https://docs.rs", "Docs.rs"));
    if !tab_a.add_bookmark(&BookmarkDraft::new("https://crates.io", " ")) {
        println!("  Rejected blank title: {}", tab_a.last_error().unwrap_or(""));
    }
    tab_a.refresh();
    tab_b.refresh();
    print_tab("A", &tab_a);
    print_tab("B", &tab_b);

    section("Delete from tab B");
    if let Some(id) = tab_b.bookmarks().last().map(|b| b.id.clone()) {
        tab_b.delete_bookmark(&id, |bookmark| {
            println!("  Confirm delete of {:?}? yes", bookmark.map(|b| b.title.as_str()));
            true
        });
    }
    tab_a.refresh();
    tab_b.refresh();
    print_tab("A", &tab_a);
    print_tab("B", &tab_b);

    section("Sign out");
    session.sign_out();
    tab_a.sync_auth();
    tab_b.sync_auth();
    println!("  Live subscriptions: {}", store.feed().live_count());
    println!("  {}", tab_a.heading());
    println!();

    Ok(())
}

fn section(name: &str) {
    println!("--- {} ---", name);
}

fn print_tab(label: &str, tab: &Dashboard<SqliteBookmarkStore>) {
    println!("  [tab {}] {}", label, tab.heading());
    for bookmark in tab.bookmarks() {
        println!("    {:<10} {}", bookmark.title, bookmark.url);
    }
}
