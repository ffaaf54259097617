#![allow(dead_code)]

use chrono::NaiveDate;
use std::io::Write;
use std::sync::Arc;
use tradejournal::adapters::local_auth::LocalAuth;
use tradejournal::domain::error::JournalError;
use tradejournal::domain::trade::{CloseReason, Direction, TradeEntry, TradeRecord};
use tradejournal::ports::auth_port::AuthPort;
use tradejournal::ports::store_port::{SnapshotListener, Subscription, TradeStorePort};

/// Store whose writes always fail; reads return an empty journal.
pub struct FailingStore {
    pub reason: String,
}

impl FailingStore {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }

    fn fail<T>(&self) -> Result<T, JournalError> {
        Err(JournalError::Store {
            reason: self.reason.clone(),
        })
    }
}

impl TradeStorePort for FailingStore {
    fn subscribe(
        &self,
        _collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, JournalError> {
        listener(&[]);
        Ok(Subscription(0))
    }

    fn unsubscribe(&self, _subscription: Subscription) {}

    fn create(&self, _collection: &str, _record: &TradeRecord) -> Result<String, JournalError> {
        self.fail()
    }

    fn update(&self, _collection: &str, _id: &str, _record: &TradeRecord) -> Result<(), JournalError> {
        self.fail()
    }

    fn delete(&self, _collection: &str, _id: &str) -> Result<(), JournalError> {
        self.fail()
    }

    fn snapshot(&self, _collection: &str) -> Result<Vec<TradeEntry>, JournalError> {
        Ok(Vec::new())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_record(day: &str, pair: &str, pnl: Option<f64>) -> TradeRecord {
    let mut record = TradeRecord::new(date(day), pair, Direction::Buy, 1.0, CloseReason::Manual);
    record.entry_price = Some(1.1000);
    record.stop_loss = Some(1.0950);
    record.take_profit = Some(1.1100);
    record.profit_loss = pnl;
    record
}

pub fn make_entry(id: &str, day: &str, pnl: Option<f64>) -> TradeEntry {
    TradeEntry::new(id, make_record(day, "EURUSD", pnl))
}

/// Mixed journal: 3 winners, 2 losers, one break-even, one missing P&L.
pub fn sample_entries() -> Vec<TradeEntry> {
    let mut entries = vec![
        make_entry("a", "2024-03-04", Some(250.0)),
        make_entry("b", "2024-03-04", Some(-100.0)),
        make_entry("c", "2024-03-05", Some(400.0)),
        make_entry("d", "2024-03-06", Some(0.0)),
        make_entry("e", "2024-03-07", Some(-150.0)),
        make_entry("f", "2024-03-08", Some(50.0)),
        make_entry("g", "2024-03-08", None),
    ];
    entries[0].record.session = "London".into();
    entries[1].record.session = "London".into();
    entries[2].record.session = "New York".into();
    entries[2].record.setup_name = "Breakout".into();
    entries
}

pub fn signed_in(user_id: &str) -> LocalAuth {
    let auth = LocalAuth::new();
    auth.sign_in(user_id, None).unwrap();
    auth
}

pub fn shared<S: TradeStorePort + 'static>(store: S) -> Arc<dyn TradeStorePort> {
    Arc::new(store)
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
