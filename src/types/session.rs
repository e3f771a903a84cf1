use serde::{Deserialize, Serialize};

/// The authenticated user as reported by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            full_name: None,
        }
    }

    /// Name shown in the dashboard header.
    ///
    /// Full name first, then the local part of the email, then `"User"`.
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            return name;
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
    }
}

/// Authentication state broadcast to views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(User),
}

impl AuthState {
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            AuthState::SignedIn(user) => Some(&user.id),
            AuthState::SignedOut => None,
        }
    }
}
