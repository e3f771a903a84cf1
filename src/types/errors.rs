use std::fmt;

// === StoreError ===

/// Errors reported by the bookmark store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database operation failed.
    DatabaseError(String),
    /// The store refused the values it was given.
    Rejected(String),
    /// No row owned by the caller matched the given ID.
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(msg) => write!(f, "Bookmark store database error: {}", msg),
            StoreError::Rejected(msg) => write!(f, "Bookmark store rejected request: {}", msg),
            StoreError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

// === FetchError ===

/// Errors from loading the initial bookmark list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No user is signed in.
    NotSignedIn,
    /// The store query failed.
    Store(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotSignedIn => write!(f, "Cannot load bookmarks: not signed in"),
            FetchError::Store(msg) => write!(f, "Failed to load bookmarks: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<StoreError> for FetchError {
    fn from(e: StoreError) -> Self {
        FetchError::Store(e.to_string())
    }
}

// === WriteError ===

/// Errors from insert, update, or delete requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// No user is signed in.
    NotSignedIn,
    /// A required field was empty.
    InvalidInput(String),
    /// The store rejected the request.
    Rejected(String),
    /// The targeted bookmark does not exist for this owner.
    NotFound(String),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::NotSignedIn => write!(f, "Cannot modify bookmarks: not signed in"),
            WriteError::InvalidInput(msg) => write!(f, "Invalid bookmark: {}", msg),
            WriteError::Rejected(msg) => write!(f, "Bookmark write rejected: {}", msg),
            WriteError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<StoreError> for WriteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => WriteError::NotFound(id),
            StoreError::Rejected(msg) => WriteError::Rejected(msg),
            StoreError::DatabaseError(msg) => WriteError::Rejected(msg),
        }
    }
}

// === SubscriptionError ===

/// Errors from the change feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The feed does not publish changes for this table.
    UnknownTable(String),
    /// The feed was closed by the store.
    Closed,
    /// A payload could not be decoded into a bookmark event.
    Decode(String),
    /// No user is signed in.
    NotSignedIn,
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionError::UnknownTable(table) => {
                write!(f, "No change feed for table: {}", table)
            }
            SubscriptionError::Closed => write!(f, "Change feed closed"),
            SubscriptionError::Decode(msg) => write!(f, "Malformed change event: {}", msg),
            SubscriptionError::NotSignedIn => {
                write!(f, "Cannot subscribe to changes: not signed in")
            }
        }
    }
}

impl std::error::Error for SubscriptionError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
