//! Auth session boundary.
//!
//! The OAuth exchange happens elsewhere; this module only holds its outcome
//! (the signed-in [`User`]) and broadcasts sign-in/sign-out to views through
//! a `tokio::sync::watch` channel.

use tokio::sync::watch;
use tracing::info;

use crate::types::session::{AuthState, User};

/// Receiving end of the auth-state signal.
pub type AuthStateReceiver = watch::Receiver<AuthState>;

/// Trait defining the session operations views depend on.
pub trait AuthSessionTrait {
    fn current_owner_id(&self) -> Option<String>;
    fn current_user(&self) -> Option<User>;
    fn subscribe(&self) -> AuthStateReceiver;
}

/// Holds the current auth state and notifies subscribers when it changes.
pub struct AuthSession {
    state: watch::Sender<AuthState>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self { state }
    }

    /// Records a completed sign-in.
    pub fn sign_in(&self, user: User) {
        info!(user_id = %user.id, "signed in");
        self.state.send_replace(AuthState::SignedIn(user));
    }

    pub fn sign_out(&self) {
        let previous = self.state.send_replace(AuthState::SignedOut);
        if let Some(owner_id) = previous.owner_id() {
            info!(user_id = %owner_id, "signed out");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().owner_id().is_some()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSessionTrait for AuthSession {
    fn current_owner_id(&self) -> Option<String> {
        self.state.borrow().owner_id().map(str::to_string)
    }

    fn current_user(&self) -> Option<User> {
        match &*self.state.borrow() {
            AuthState::SignedIn(user) => Some(user.clone()),
            AuthState::SignedOut => None,
        }
    }

    fn subscribe(&self) -> AuthStateReceiver {
        self.state.subscribe()
    }
}
