//! Snapshot listener bookkeeping shared by the store adapters.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::error::JournalError;
use crate::ports::store_port::{SnapshotListener, Subscription};

struct Registered {
    collection: String,
    listener: SnapshotListener,
}

pub struct ListenerRegistry {
    listeners: Mutex<HashMap<u64, Registered>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn register(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, JournalError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().map_err(JournalError::store)?.insert(
            id,
            Registered {
                collection: collection.to_string(),
                listener,
            },
        );
        Ok(Subscription(id))
    }

    pub fn remove(&self, subscription: Subscription) -> bool {
        self.listeners
            .lock()
            .map(|mut l| l.remove(&subscription.0).is_some())
            .unwrap_or(false)
    }

    /// Listeners on `collection`, cloned out so callers can invoke them unlocked.
    pub fn for_collection(&self, collection: &str) -> Vec<SnapshotListener> {
        self.listeners
            .lock()
            .map(|l| {
                l.values()
                    .filter(|r| r.collection == collection)
                    .map(|r| r.listener.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
