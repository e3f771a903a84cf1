//! Bookmark state reconciler.
//!
//! Keeps one tab's view of the signed-in user's bookmarks consistent with the
//! store. Writes go to the store only; the list changes in reaction to the
//! fetched snapshot and to change-feed events, so every tab follows the same
//! update path no matter which one issued the write.
//!
//! Events may arrive before the snapshot. While the first fetch for an owner
//! is outstanding, the newest event per bookmark id is kept and replayed on
//! top of the snapshot. The event handler is idempotent, so the replay cannot
//! duplicate rows and cannot resurrect deleted ones. After a failed fetch
//! nothing is buffered: the next [`BookmarkReconciler::initialize`] starts
//! from a fresh snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::managers::bookmark_store::{BookmarkStoreTrait, BOOKMARKS_TABLE};
use crate::managers::change_feed::Subscription;
use crate::types::bookmark::{Bookmark, BookmarkKey};
use crate::types::change::ChangeEvent;
use crate::types::errors::{FetchError, SubscriptionError, WriteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snapshot {
    /// No fetch has completed for the current owner yet.
    Pending,
    /// The last fetch failed; events are dropped until the next one.
    Failed,
    Loaded,
}

/// Newest buffered change for one bookmark id.
#[derive(Debug, Clone)]
enum Buffered {
    /// Seen as an insert, possibly updated since.
    Upsert(Bookmark),
    Update(Bookmark),
    Delete(BookmarkKey),
}

/// Outcome of draining the change feed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drained {
    /// Events decoded and handed to the list.
    pub processed: usize,
    /// Decode failures in arrival order, then `Closed` if the feed ended.
    pub errors: Vec<SubscriptionError>,
}

impl Drained {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn closed(&self) -> bool {
        self.errors.contains(&SubscriptionError::Closed)
    }
}

/// Per-tab bookmark list synchronized through a store's change feed.
pub struct BookmarkReconciler<S: BookmarkStoreTrait + ?Sized> {
    store: Arc<S>,
    records: Vec<Bookmark>,
    owner_id: Option<String>,
    subscription: Option<Subscription>,
    snapshot: Snapshot,
    replay: HashMap<String, (u64, Buffered)>,
    replay_seq: u64,
}

impl<S: BookmarkStoreTrait + ?Sized> BookmarkReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            records: Vec::new(),
            owner_id: None,
            subscription: None,
            snapshot: Snapshot::Pending,
            replay: HashMap::new(),
            replay_seq: 0,
        }
    }

    /// Current list, newest first.
    pub fn records(&self) -> &[Bookmark] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    /// Whether a snapshot has been loaded for the current owner.
    pub fn is_loaded(&self) -> bool {
        self.snapshot == Snapshot::Loaded
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of bookmark ids with a change waiting for the snapshot.
    pub fn buffered_events(&self) -> usize {
        self.replay.len()
    }

    /// Loads the owner's bookmarks from the store and replaces the list.
    ///
    /// On failure the list is left empty and the error is returned as is.
    pub fn initialize(&mut self, owner_id: &str) -> Result<(), FetchError> {
        if owner_id.is_empty() {
            return Err(FetchError::NotSignedIn);
        }
        self.switch_owner(owner_id);

        let rows = match self.store.fetch_all(owner_id) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(owner_id, error = %e, dropped = self.replay.len(), "initial bookmark fetch failed");
                self.records.clear();
                self.replay.clear();
                self.snapshot = Snapshot::Failed;
                return Err(e.into());
            }
        };

        let mut snapshot: Vec<Bookmark> = Vec::with_capacity(rows.len());
        for row in rows {
            if row.owner_id != owner_id {
                warn!(id = %row.id, "snapshot row for another owner dropped");
                continue;
            }
            if snapshot.iter().any(|b| b.id == row.id) {
                continue;
            }
            snapshot.push(row);
        }
        // Stable: rows with equal timestamps keep the store's order.
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.records = snapshot;
        self.snapshot = Snapshot::Loaded;

        let mut pending: Vec<(u64, Buffered)> = self.replay.drain().map(|(_, entry)| entry).collect();
        pending.sort_by_key(|(seq, _)| *seq);
        let replayed = pending.len();
        for (_, buffered) in pending {
            match buffered {
                Buffered::Upsert(row) => {
                    self.apply(ChangeEvent::Insert(row.clone()));
                    self.apply(ChangeEvent::Update(row));
                }
                Buffered::Update(row) => {
                    self.apply(ChangeEvent::Update(row));
                }
                Buffered::Delete(key) => {
                    self.apply(ChangeEvent::Delete(key));
                }
            }
        }

        info!(owner_id, count = self.records.len(), replayed, "bookmarks initialized");
        Ok(())
    }

    /// Opens the change-feed subscription for `owner_id`.
    ///
    /// No-op while a subscription for the same owner is live. A subscription
    /// for another owner is released before the new one is opened.
    pub fn subscribe(&mut self, owner_id: &str) -> Result<(), SubscriptionError> {
        if owner_id.is_empty() {
            return Err(SubscriptionError::NotSignedIn);
        }
        if self
            .subscription
            .as_ref()
            .is_some_and(|sub| sub.owner_id() == owner_id)
        {
            trace!(owner_id, "already subscribed");
            return Ok(());
        }

        // A different owner's subscription is released here.
        self.switch_owner(owner_id);

        let subscription = self.store.subscribe_changes(owner_id, BOOKMARKS_TABLE)?;
        info!(owner_id, table = BOOKMARKS_TABLE, "subscribed to bookmark changes");
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Applies one decoded change event. Returns whether the list changed.
    pub fn on_change_event(&mut self, event: ChangeEvent) -> bool {
        let Some(owner) = self.owner_id.as_deref() else {
            trace!(id = event.id(), "change event with no active owner ignored");
            return false;
        };
        if let Some(event_owner) = event.owner_id() {
            if event_owner != owner {
                debug!(id = event.id(), "change event for another owner ignored");
                return false;
            }
        }

        match self.snapshot {
            Snapshot::Loaded => {}
            Snapshot::Pending => self.buffer(&event),
            Snapshot::Failed => {
                trace!(id = event.id(), "change event dropped until the next fetch");
                return false;
            }
        }
        self.apply(event)
    }

    /// Drains every payload queued on the subscription, in arrival order.
    ///
    /// A payload that fails to decode is skipped and reported; draining goes
    /// on. A closed feed releases the subscription and is reported as
    /// [`SubscriptionError::Closed`].
    pub fn process_pending(&mut self) -> Drained {
        let mut drained = Drained::default();
        loop {
            let next = match self.subscription.as_mut() {
                Some(sub) => sub.try_next(),
                None => return drained,
            };

            match next {
                Ok(Some(payload)) => match ChangeEvent::decode(&payload) {
                    Ok(event) => {
                        self.on_change_event(event);
                        drained.processed += 1;
                    }
                    Err(e) => {
                        warn!(error = %e, "skipping undecodable change payload");
                        drained.errors.push(e);
                    }
                },
                Ok(None) => return drained,
                Err(e) => {
                    self.drop_subscription(&e);
                    drained.errors.push(e);
                    return drained;
                }
            }
        }
    }

    /// Waits for the next change payload and applies it.
    ///
    /// Returns whether the list changed.
    pub async fn next_change(&mut self) -> Result<bool, SubscriptionError> {
        let payload = match self.subscription.as_mut() {
            Some(sub) => sub.next().await,
            None => return Err(SubscriptionError::NotSignedIn),
        };

        match payload {
            Some(payload) => {
                let event = ChangeEvent::decode(&payload)?;
                Ok(self.on_change_event(event))
            }
            None => {
                let e = SubscriptionError::Closed;
                self.drop_subscription(&e);
                Err(e)
            }
        }
    }

    /// Asks the store to create a bookmark. The list is not touched here.
    pub fn request_insert(&self, url: &str, title: &str) -> Result<(), WriteError> {
        let owner_id = self.owner_id.as_deref().ok_or(WriteError::NotSignedIn)?;
        let (url, title) = Self::require_fields(url, title)?;

        self.store.insert(owner_id, url, title).map_err(|e| {
            warn!(owner_id, error = %e, "bookmark insert rejected");
            WriteError::from(e)
        })?;
        debug!(owner_id, url, "bookmark insert accepted");
        Ok(())
    }

    /// Asks the store to change a bookmark's url and title.
    pub fn request_update(&self, id: &str, url: &str, title: &str) -> Result<(), WriteError> {
        let owner_id = self.owner_id.as_deref().ok_or(WriteError::NotSignedIn)?;
        let (url, title) = Self::require_fields(url, title)?;

        self.store.update(id, owner_id, url, title).map_err(|e| {
            warn!(owner_id, id, error = %e, "bookmark update rejected");
            WriteError::from(e)
        })?;
        Ok(())
    }

    /// Asks the store to delete a bookmark once `confirm` approves.
    ///
    /// `confirm` receives the tracked bookmark, if any. Returns `Ok(false)`
    /// when the caller declined and nothing was sent.
    pub fn request_delete<F>(&self, id: &str, confirm: F) -> Result<bool, WriteError>
    where
        F: FnOnce(Option<&Bookmark>) -> bool,
    {
        let owner_id = self.owner_id.as_deref().ok_or(WriteError::NotSignedIn)?;

        let tracked = self.records.iter().find(|b| b.id == id);
        if !confirm(tracked) {
            debug!(id, "bookmark delete declined");
            return Ok(false);
        }

        self.store.delete(id, owner_id).map_err(|e| {
            warn!(owner_id, id, error = %e, "bookmark delete rejected");
            WriteError::from(e)
        })?;
        Ok(true)
    }

    /// Releases the subscription and forgets the owner and its list.
    pub fn teardown(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.release();
        }
        if let Some(owner_id) = self.owner_id.take() {
            info!(%owner_id, "bookmark reconciler torn down");
        }
        self.records.clear();
        self.replay.clear();
        self.snapshot = Snapshot::Pending;
    }

    fn switch_owner(&mut self, owner_id: &str) {
        if self.owner_id.as_deref() == Some(owner_id) {
            return;
        }
        if self.owner_id.is_some() {
            debug!(owner_id, "owner changed, resetting reconciler");
        }
        self.teardown();
        self.owner_id = Some(owner_id.to_string());
    }

    fn buffer(&mut self, event: &ChangeEvent) {
        self.replay_seq += 1;
        let entry = match event {
            ChangeEvent::Insert(row) => Buffered::Upsert(row.clone()),
            ChangeEvent::Update(row) => match self.replay.get(&row.id) {
                Some((_, Buffered::Upsert(_))) => Buffered::Upsert(row.clone()),
                _ => Buffered::Update(row.clone()),
            },
            ChangeEvent::Delete(key) => Buffered::Delete(key.clone()),
        };
        self.replay.insert(event.id().to_string(), (self.replay_seq, entry));
    }

    fn drop_subscription(&mut self, reason: &SubscriptionError) {
        if let Some(sub) = self.subscription.take() {
            warn!(owner_id = %sub.owner_id(), error = %reason, "change feed lost");
            sub.release();
        }
    }

    fn require_fields<'a>(url: &'a str, title: &'a str) -> Result<(&'a str, &'a str), WriteError> {
        let url = url.trim();
        let title = title.trim();
        if url.is_empty() {
            return Err(WriteError::InvalidInput("url is required".to_string()));
        }
        if title.is_empty() {
            return Err(WriteError::InvalidInput("title is required".to_string()));
        }
        Ok((url, title))
    }

    fn apply(&mut self, event: ChangeEvent) -> bool {
        match event {
            ChangeEvent::Insert(row) => {
                if self.records.iter().any(|b| b.id == row.id) {
                    trace!(id = %row.id, "duplicate insert discarded");
                    return false;
                }
                let at = self
                    .records
                    .iter()
                    .position(|b| b.created_at <= row.created_at)
                    .unwrap_or(self.records.len());
                self.records.insert(at, row);
                true
            }
            ChangeEvent::Update(row) => match self.records.iter_mut().find(|b| b.id == row.id) {
                Some(slot) if *slot == row => false,
                Some(slot) => {
                    *slot = row;
                    true
                }
                None => {
                    trace!(id = %row.id, "update for untracked bookmark discarded");
                    false
                }
            },
            ChangeEvent::Delete(key) => {
                let before = self.records.len();
                self.records.retain(|b| b.id != key.id);
                self.records.len() != before
            }
        }
    }
}
