use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    pub store: StoreSettings,
    pub realtime: RealtimeSettings,
    pub auth: AuthSettings,
    pub logging: LoggingSettings,
}

/// Where bookmarks are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoreSettings {
    /// SQLite file path. `None` means the platform data directory.
    pub database_path: Option<String>,
}

/// Change feed settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeSettings {
    pub channel: String,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            channel: "realtime-dashboard".to_string(),
        }
    }
}

/// OAuth settings. The code exchange itself happens outside this crate; the
/// route guard reads the callback path and builds the sign-in request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSettings {
    pub provider: String,
    pub redirect_path: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            redirect_path: "/auth/callback".to_string(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `"info"` or `"smart_bookmarks=debug"`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
