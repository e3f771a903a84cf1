//! Dashboard view controller.
//!
//! Owns one tab's [`BookmarkReconciler`] and drives its lifecycle from the
//! auth-state signal: sign-in subscribes and loads, sign-out tears down.
//! Errors are kept as user-facing text instead of being retried.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::managers::auth_session::AuthStateReceiver;
use crate::managers::bookmark_store::BookmarkStoreTrait;
use crate::managers::reconciler::BookmarkReconciler;
use crate::types::bookmark::{Bookmark, BookmarkDraft};
use crate::types::errors::SubscriptionError;
use crate::types::session::{AuthState, User};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

pub struct Dashboard<S: BookmarkStoreTrait + ?Sized> {
    reconciler: BookmarkReconciler<S>,
    auth: AuthStateReceiver,
    user: Option<User>,
    last_error: Option<String>,
}

impl<S: BookmarkStoreTrait + ?Sized> Dashboard<S> {
    pub fn new(store: Arc<S>, auth: AuthStateReceiver) -> Self {
        Self {
            reconciler: BookmarkReconciler::new(store),
            auth,
            user: None,
            last_error: None,
        }
    }

    /// Brings the reconciler in line with the latest auth state.
    ///
    /// Subscribes before loading so that nothing committed between the two
    /// steps is missed. If both steps fail, both messages are kept.
    /// Returns whether the signed-in owner changed.
    pub fn sync_auth(&mut self) -> bool {
        let state = self.auth.borrow_and_update().clone();
        let wanted = state.owner_id().map(str::to_string);
        if wanted.as_deref() == self.reconciler.owner_id() && wanted.is_some() == self.user.is_some() {
            return false;
        }

        match state {
            AuthState::SignedOut => {
                debug!("auth signed out, tearing down dashboard");
                self.reconciler.teardown();
                self.user = None;
                self.last_error = None;
            }
            AuthState::SignedIn(user) => {
                let mut errors = Vec::new();
                if let Err(e) = self.reconciler.subscribe(&user.id) {
                    warn!(error = %e, "real-time subscription failed");
                    errors.push(e.to_string());
                }
                if let Err(e) = self.reconciler.initialize(&user.id) {
                    errors.push(e.to_string());
                }
                self.last_error = (!errors.is_empty()).then(|| errors.join("; "));
                self.user = Some(user);
            }
        }
        true
    }

    /// Applies queued change events. Returns how many were processed.
    ///
    /// Malformed events are skipped; their messages end up in `last_error`.
    pub fn refresh(&mut self) -> usize {
        let drained = self.reconciler.process_pending();
        if !drained.is_clean() {
            let messages: Vec<String> = drained.errors.iter().map(|e| e.to_string()).collect();
            self.last_error = Some(messages.join("; "));
        }
        drained.processed
    }

    /// Re-opens the change feed after it was lost.
    pub fn resubscribe(&mut self) -> Result<(), SubscriptionError> {
        let owner_id = self
            .reconciler
            .owner_id()
            .map(str::to_string)
            .ok_or(SubscriptionError::NotSignedIn)?;
        self.reconciler.subscribe(&owner_id)?;
        self.last_error = None;
        Ok(())
    }

    /// Reloads the list from the store, e.g. after a failed initial fetch.
    pub fn reload(&mut self) -> bool {
        let Some(owner_id) = self.reconciler.owner_id().map(str::to_string) else {
            return false;
        };
        match self.reconciler.initialize(&owner_id) {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    /// Submits the add-bookmark form. Returns whether the store accepted it.
    ///
    /// The new row appears once its change event is processed.
    pub fn add_bookmark(&mut self, draft: &BookmarkDraft) -> bool {
        if self.user.is_none() {
            return false;
        }
        let Some((url, title)) = draft.normalized() else {
            self.last_error = Some(MISSING_FIELDS_MESSAGE.to_string());
            return false;
        };

        match self.reconciler.request_insert(url, title) {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(e) => {
                self.last_error = Some(format!("Failed to add bookmark: {}", e));
                false
            }
        }
    }

    /// Deletes a bookmark after `confirm` approves. Returns whether a request was sent.
    pub fn delete_bookmark<F>(&mut self, id: &str, confirm: F) -> bool
    where
        F: FnOnce(Option<&Bookmark>) -> bool,
    {
        match self.reconciler.request_delete(id, confirm) {
            Ok(sent) => sent,
            Err(e) => {
                self.last_error = Some(format!("Failed to delete bookmark: {}", e));
                false
            }
        }
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        self.reconciler.records()
    }

    pub fn bookmark_count(&self) -> usize {
        self.reconciler.len()
    }

    pub fn heading(&self) -> String {
        format!("Your Bookmarks ({})", self.bookmark_count())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.reconciler.is_subscribed()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn reconciler(&self) -> &BookmarkReconciler<S> {
        &self.reconciler
    }
}
