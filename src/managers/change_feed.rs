//! Owner-scoped change feed.
//!
//! The store publishes one [`ChangePayload`] per committed write; every live
//! [`Subscription`] whose `(owner_id, table)` filter matches receives its own
//! copy. Subscriptions remove themselves from the registry exactly once, on
//! [`Subscription::release`] or when dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

use crate::types::change::ChangePayload;
use crate::types::errors::SubscriptionError;

struct Entry {
    owner_id: String,
    table: String,
    sender: UnboundedSender<ChangePayload>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: HashMap<u64, Entry>,
}

/// Fan-out registry shared by a store and its subscriptions.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a subscription for one owner's changes to one table.
    pub fn register(&self, owner_id: &str, table: &str) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = match self.registry.lock() {
            Ok(mut reg) => {
                reg.next_id += 1;
                let id = reg.next_id;
                reg.entries.insert(
                    id,
                    Entry {
                        owner_id: owner_id.to_string(),
                        table: table.to_string(),
                        sender,
                    },
                );
                id
            }
            // A poisoned registry cannot deliver anything; the receiver
            // reports Closed on first poll.
            Err(_) => 0,
        };
        debug!(subscription = id, owner_id, table, "change feed subscription opened");

        Subscription {
            id,
            owner_id: owner_id.to_string(),
            table: table.to_string(),
            receiver,
            registry: Arc::downgrade(&self.registry),
            released: false,
        }
    }

    /// Delivers `payload` to every matching subscription. Returns how many received it.
    pub fn publish(&self, owner_id: &str, table: &str, payload: &ChangePayload) -> usize {
        let Ok(mut reg) = self.registry.lock() else {
            return 0;
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, entry) in reg.entries.iter() {
            if entry.owner_id != owner_id || entry.table != table {
                continue;
            }
            if entry.sender.send(payload.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            reg.entries.remove(&id);
        }

        trace!(owner_id, table, event = %payload.event_type, delivered, "change published");
        delivered
    }

    /// Number of subscriptions currently registered.
    pub fn live_count(&self) -> usize {
        self.registry.lock().map(|reg| reg.entries.len()).unwrap_or(0)
    }

    /// Drops every sender. Open subscriptions observe [`SubscriptionError::Closed`].
    pub fn close_all(&self) {
        if let Ok(mut reg) = self.registry.lock() {
            let closed = reg.entries.len();
            reg.entries.clear();
            debug!(closed, "change feed closed");
        }
    }
}

/// Handle to one live feed subscription.
pub struct Subscription {
    id: u64,
    owner_id: String,
    table: String,
    receiver: UnboundedReceiver<ChangePayload>,
    registry: Weak<Mutex<Registry>>,
    released: bool,
}

impl Subscription {
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the next pending payload without blocking.
    ///
    /// `Ok(None)` means nothing is queued right now.
    pub fn try_next(&mut self) -> Result<Option<ChangePayload>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(payload) => Ok(Some(payload)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Waits for the next payload. `None` once the feed is closed.
    pub async fn next(&mut self) -> Option<ChangePayload> {
        self.receiver.recv().await
    }

    /// Unregisters from the feed.
    pub fn release(mut self) {
        self.unregister();
    }

    fn unregister(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.receiver.close();
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut reg) = registry.lock() {
                reg.entries.remove(&self.id);
            }
        }
        debug!(subscription = self.id, owner_id = %self.owner_id, "change feed subscription released");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("table", &self.table)
            .finish()
    }
}
