//! Trade store port trait.

use std::sync::Arc;

use crate::domain::error::JournalError;
use crate::domain::trade::{TradeEntry, TradeRecord};

/// Receives the full contents of a collection after every change.
pub type SnapshotListener = Arc<dyn Fn(&[TradeEntry]) + Send + Sync>;

/// Handle returned by [`TradeStorePort::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// Collection holding one user's journal.
pub fn journal_path(user_id: &str) -> String {
    format!("tradingJournal/{user_id}")
}

pub trait TradeStorePort: Send + Sync {
    /// Register a listener. It is called once with the current snapshot and
    /// again after every successful write to `collection`.
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, JournalError>;

    fn unsubscribe(&self, subscription: Subscription);

    /// Store a new record and return its assigned id.
    fn create(&self, collection: &str, record: &TradeRecord) -> Result<String, JournalError>;

    /// Overwrite the record stored under `id`, creating it if absent.
    fn update(&self, collection: &str, id: &str, record: &TradeRecord) -> Result<(), JournalError>;

    /// Remove `id`. Removing an unknown id succeeds.
    fn delete(&self, collection: &str, id: &str) -> Result<(), JournalError>;

    /// Current contents of `collection`, in no particular order.
    fn snapshot(&self, collection: &str) -> Result<Vec<TradeEntry>, JournalError>;
}
