// Platform-specific locations for the settings file and the bookmark database.
//
// Linux/BSD follow XDG, macOS uses Application Support, Windows uses %APPDATA%.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "smart-bookmarks";

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        appdata_dir()
    }
    #[cfg(target_os = "macos")]
    {
        application_support_dir()
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
}

/// Directory holding the SQLite database.
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        appdata_dir()
    }
    #[cfg(target_os = "macos")]
    {
        application_support_dir()
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    if let Ok(base) = env::var(var) {
        if !base.is_empty() {
            return PathBuf::from(base).join(APP_DIR);
        }
    }
    let mut path = PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")));
    for part in fallback {
        path.push(part);
    }
    path.join(APP_DIR)
}

#[cfg(target_os = "macos")]
fn application_support_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
        .join(APP_DIR)
}

#[cfg(target_os = "windows")]
fn appdata_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join(APP_DIR)
}
