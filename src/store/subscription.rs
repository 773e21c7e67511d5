//! Live query subscriptions.
//!
//! Each subscription owns the receiving half of a channel; the store keeps the
//! sending half in a [`ListenerRegistry`] and pushes a full result set after
//! every committed change to the subscribed collection.

use crate::error::StoreError;
use crate::store::{CollectionPath, Document, Query};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::debug;

/// One delivery on a subscription.
#[derive(Debug)]
pub enum SnapshotEvent {
    /// The complete, ordered result set. Replaces any previous snapshot.
    Snapshot(Vec<Document>),
    /// The listener failed to produce a snapshot.
    Error(StoreError),
}

struct Listener {
    query: Query,
    sender: Sender<SnapshotEvent>,
}

/// Registered listeners, keyed by subscription id.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, Listener>>,
}

impl ListenerRegistry {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn register(self: &Arc<Self>, query: Query) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = channel();
        self.listeners.lock().insert(
            id,
            Listener {
                query: query.clone(),
                sender,
            },
        );
        debug!(subscription = id, collection = %query.collection, "Listener registered");
        Subscription {
            id,
            query,
            receiver,
            registry: Some(Arc::downgrade(self)),
        }
    }

    pub(crate) fn remove(&self, id: u64) -> bool {
        self.listeners.lock().remove(&id).is_some()
    }

    /// Listeners whose query targets `collection`.
    pub(crate) fn listening_on(&self, collection: &CollectionPath) -> Vec<(u64, Query)> {
        self.listeners
            .lock()
            .iter()
            .filter(|(_, l)| &l.query.collection == collection)
            .map(|(id, l)| (*id, l.query.clone()))
            .collect()
    }

    /// Deliver to one listener, dropping it if the receiver is gone.
    pub(crate) fn send(&self, id: u64, event: SnapshotEvent) {
        let mut listeners = self.listeners.lock();
        let disconnected = match listeners.get(&id) {
            Some(listener) => listener.sender.send(event).is_err(),
            None => false,
        };
        if disconnected {
            listeners.remove(&id);
            debug!(subscription = id, "Dropped listener with closed receiver");
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Handle to a live query. Closing (or dropping) it unregisters the listener.
pub struct Subscription {
    id: u64,
    query: Query,
    receiver: Receiver<SnapshotEvent>,
    registry: Option<Weak<ListenerRegistry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn is_closed(&self) -> bool {
        self.registry.is_none()
    }

    /// Next pending event without blocking. Always `None` once closed.
    pub fn try_next(&mut self) -> Option<SnapshotEvent> {
        if self.is_closed() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<SnapshotEvent> {
        if self.is_closed() {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Every event queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<SnapshotEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_next() {
            events.push(event);
        }
        events
    }

    /// Unregister the listener. Returns `true` only for the call that closed it.
    pub fn close(&mut self) -> bool {
        match self.registry.take() {
            Some(weak) => {
                if let Some(registry) = weak.upgrade() {
                    registry.remove(self.id);
                }
                debug!(subscription = self.id, "Subscription closed");
                true
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("collection", &self.query.collection)
            .field("closed", &self.is_closed())
            .finish()
    }
}
