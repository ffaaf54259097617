//! A signed-in user's live view of their journal.
//!
//! `JournalSession` subscribes to the user's collection and recomputes a
//! `JournalView` on every snapshot the store delivers.

use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};

use super::analytics::{self, CumulativePoint, SummaryStats, WinLossBreakdown};
use super::error::JournalError;
use super::form::FormController;
use super::trade::TradeEntry;
use crate::ports::auth_port::{AuthPort, User};
use crate::ports::store_port::{SnapshotListener, Subscription, TradeStorePort, journal_path};

/// Everything derived from one snapshot of the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalView {
    /// Entries in date order.
    pub entries: Vec<TradeEntry>,
    pub summary: SummaryStats,
    pub breakdown: WinLossBreakdown,
    pub daily: Vec<CumulativePoint>,
    pub expectancy: f64,
}

impl JournalView {
    pub fn from_snapshot(entries: &[TradeEntry]) -> Self {
        let mut entries = entries.to_vec();
        analytics::sort_by_date(&mut entries);
        JournalView {
            summary: analytics::summary_stats(&entries),
            breakdown: analytics::win_loss_breakdown(&entries),
            daily: analytics::daily_cumulative_pnl(&entries),
            expectancy: analytics::expectancy(&entries),
            entries,
        }
    }
}

impl Default for JournalView {
    fn default() -> Self {
        Self::from_snapshot(&[])
    }
}

pub struct JournalSession {
    store: Arc<dyn TradeStorePort>,
    user: User,
    collection: String,
    view: Arc<RwLock<JournalView>>,
    subscription: Mutex<Option<Subscription>>,
}

impl JournalSession {
    pub fn open(store: Arc<dyn TradeStorePort>, auth: &dyn AuthPort) -> Result<Self, JournalError> {
        let user = auth.current_user().ok_or(JournalError::NotSignedIn)?;
        let collection = journal_path(&user.id);
        let view = Arc::new(RwLock::new(JournalView::default()));

        let sink = Arc::clone(&view);
        let listener: SnapshotListener = Arc::new(move |entries: &[TradeEntry]| {
            let next = JournalView::from_snapshot(entries);
            if let Ok(mut current) = sink.write() {
                *current = next;
            }
        });
        let subscription = store.subscribe(&collection, listener)?;
        info!(user = %user.id, collection = %collection, "journal session opened");

        Ok(Self {
            store,
            user,
            collection,
            view,
            subscription: Mutex::new(Some(subscription)),
        })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Copy of the most recent view.
    pub fn view(&self) -> JournalView {
        self.view
            .read()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    pub fn entry(&self, id: &str) -> Option<TradeEntry> {
        self.view
            .read()
            .ok()
            .and_then(|v| v.entries.iter().find(|e| e.id == id).cloned())
    }

    pub fn form(&self) -> FormController {
        FormController::new(Arc::clone(&self.store), self.collection.clone())
    }

    /// Form pre-filled from entry `id`.
    pub fn edit_form(&self, id: &str) -> Result<FormController, JournalError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| JournalError::NotFound { id: id.to_string() })?;
        let mut form = self.form();
        form.load_for_edit(&entry);
        Ok(form)
    }

    pub fn delete(&self, id: &str) -> Result<(), JournalError> {
        self.store.delete(&self.collection, id)?;
        debug!(collection = %self.collection, id, "delete requested");
        Ok(())
    }

    pub fn close(&self) {
        let taken = self
            .subscription
            .lock()
            .ok()
            .and_then(|mut s| s.take());
        if let Some(subscription) = taken {
            self.store.unsubscribe(subscription);
            debug!(collection = %self.collection, "journal session closed");
        }
    }
}

impl Drop for JournalSession {
    fn drop(&mut self) {
        self.close();
    }
}
