// Smart Bookmarks services
// Stateless-ish helpers around configuration.

pub mod settings_engine;
