//! In-memory trade store with snapshot listeners.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::listeners::ListenerRegistry;
use crate::domain::error::JournalError;
use crate::domain::trade::{TradeEntry, TradeRecord};
use crate::ports::store_port::{SnapshotListener, Subscription, TradeStorePort};

pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, TradeRecord>>>,
    listeners: ListenerRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn read(&self, collection: &str) -> Result<Vec<TradeEntry>, JournalError> {
        let collections = self.collections.lock().map_err(JournalError::store)?;
        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, record)| TradeEntry::new(id.clone(), record.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Deliver the current snapshot to every listener on `collection`.
    /// Listeners run with no store lock held. The write has already landed,
    /// so a failed read is logged rather than returned.
    fn notify(&self, collection: &str) {
        let targets = self.listeners.for_collection(collection);
        if targets.is_empty() {
            return;
        }

        match self.read(collection) {
            Ok(snapshot) => {
                for listener in targets {
                    listener(&snapshot);
                }
            }
            Err(e) => warn!(collection, error = %e, "could not notify listeners"),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeStorePort for MemoryStore {
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, JournalError> {
        let subscription = self.listeners.register(collection, listener.clone())?;
        debug!(collection, subscription = subscription.0, "subscribed");

        let snapshot = self.read(collection)?;
        listener(&snapshot);
        Ok(subscription)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        self.listeners.remove(subscription);
    }

    fn create(&self, collection: &str, record: &TradeRecord) -> Result<String, JournalError> {
        let id = Uuid::new_v4().to_string();
        self.collections
            .lock()
            .map_err(JournalError::store)?
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), record.clone());
        self.notify(collection);
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, record: &TradeRecord) -> Result<(), JournalError> {
        self.collections
            .lock()
            .map_err(JournalError::store)?
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), record.clone());
        self.notify(collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), JournalError> {
        let removed = self
            .collections
            .lock()
            .map_err(JournalError::store)?
            .get_mut(collection)
            .and_then(|records| records.remove(id))
            .is_some();
        if removed {
            self.notify(collection);
        }
        Ok(())
    }

    fn snapshot(&self, collection: &str) -> Result<Vec<TradeEntry>, JournalError> {
        self.read(collection)
    }
}
