//! Smart Bookmarks: a personal bookmark manager with real-time sync across tabs.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod dashboard;
pub mod database;
pub mod managers;
pub mod platform;
pub mod routes;
pub mod services;
pub mod types;
