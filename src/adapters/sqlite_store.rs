//! SQLite trade store.

use crate::adapters::listeners::ListenerRegistry;
use crate::domain::error::JournalError;
use crate::domain::trade::{
    CloseReason, Direction, TradeEntry, TradeRecord, parse_date, parse_decimal,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{SnapshotListener, Subscription, TradeStorePort};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use rusqlite::types::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, date, pair, direction, lot_size, entry_price, stop_loss,
     take_profit, exit_price, close_reason, profit_loss, session, setup_name,
     emotion_note, notes, before_chart, after_chart";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    listeners: ListenerRegistry,
}

/// Row as stored; converted to a `TradeEntry` after the query so bad rows can be skipped.
struct RawRow {
    id: String,
    date: String,
    pair: String,
    direction: String,
    lot_size: Value,
    entry_price: Value,
    stop_loss: Value,
    take_profit: Value,
    exit_price: Value,
    close_reason: String,
    profit_loss: Value,
    session: String,
    setup_name: String,
    emotion_note: String,
    notes: String,
    before_chart: String,
    after_chart: String,
}

/// Numeric column tolerant of text written by other tools.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Real(v) => Some(*v),
        Value::Integer(v) => Some(*v as f64),
        Value::Text(s) => parse_decimal(s),
        Value::Null | Value::Blob(_) => None,
    }
}

impl RawRow {
    fn into_entry(self) -> Option<TradeEntry> {
        let date = parse_date(&self.date)?;
        let direction = self.direction.parse::<Direction>().ok()?;
        let close_reason = self.close_reason.parse::<CloseReason>().ok()?;
        let lot_size = numeric(&self.lot_size)?;

        Some(TradeEntry::new(
            self.id,
            TradeRecord {
                date,
                pair: self.pair,
                direction,
                lot_size,
                entry_price: numeric(&self.entry_price),
                stop_loss: numeric(&self.stop_loss),
                take_profit: numeric(&self.take_profit),
                exit_price: numeric(&self.exit_price),
                close_reason,
                profit_loss: numeric(&self.profit_loss),
                session: self.session,
                setup_name: self.setup_name,
                emotion_note: self.emotion_note,
                notes: self.notes,
                before_chart: self.before_chart,
                after_chart: self.after_chart,
            },
        ))
    }
}

fn query_err(e: rusqlite::Error) -> JournalError {
    JournalError::store(e)
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, JournalError> {
        let db_path =
            config
                .get_string("store", "path")
                .ok_or_else(|| JournalError::ConfigMissing {
                    section: "store".into(),
                    key: "path".into(),
                })?;

        let pool_size = u32::try_from(config.get_int("store", "pool_size", 4))
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| JournalError::ConfigInvalid {
                section: "store".into(),
                key: "pool_size".into(),
                reason: "must be between 1 and 4294967295".into(),
            })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| JournalError::store(e))?;

        let store = Self {
            pool,
            listeners: ListenerRegistry::new(),
        };
        store.initialize_schema()?;
        info!(path = %db_path, "opened sqlite trade store");
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, JournalError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| JournalError::store(e))?;

        let store = Self {
            pool,
            listeners: ListenerRegistry::new(),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, JournalError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| JournalError::store(e))
    }

    pub fn initialize_schema(&self) -> Result<(), JournalError> {
        let conn = self.connection()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trades (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                date TEXT NOT NULL,
                pair TEXT NOT NULL,
                direction TEXT NOT NULL,
                lot_size REAL NOT NULL,
                entry_price REAL,
                stop_loss REAL,
                take_profit REAL,
                exit_price REAL,
                close_reason TEXT NOT NULL,
                profit_loss REAL,
                session TEXT NOT NULL DEFAULT '',
                setup_name TEXT NOT NULL DEFAULT '',
                emotion_note TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                before_chart TEXT NOT NULL DEFAULT '',
                after_chart TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (collection, id)
            );
            CREATE INDEX IF NOT EXISTS idx_trades_collection_date ON trades(collection, date);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn upsert(&self, collection: &str, id: &str, record: &TradeRecord) -> Result<(), JournalError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO trades (collection, id, date, pair, direction, lot_size,
                 entry_price, stop_loss, take_profit, exit_price, close_reason, profit_loss,
                 session, setup_name, emotion_note, notes, before_chart, after_chart)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                collection,
                id,
                record.date.format("%Y-%m-%d").to_string(),
                record.pair,
                record.direction.to_string(),
                record.lot_size,
                record.entry_price,
                record.stop_loss,
                record.take_profit,
                record.exit_price,
                record.close_reason.label(),
                record.profit_loss,
                record.session,
                record.setup_name,
                record.emotion_note,
                record.notes,
                record.before_chart,
                record.after_chart,
            ],
        )
        .map_err(query_err)?;
        Ok(())
    }

    fn read(&self, collection: &str) -> Result<Vec<TradeEntry>, JournalError> {
        let conn = self.connection()?;
        let query = format!("SELECT {SELECT_COLUMNS} FROM trades WHERE collection = ?1 ORDER BY date ASC, id ASC");
        let mut stmt = conn.prepare(&query).map_err(query_err)?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    pair: row.get(2)?,
                    direction: row.get(3)?,
                    lot_size: row.get(4)?,
                    entry_price: row.get(5)?,
                    stop_loss: row.get(6)?,
                    take_profit: row.get(7)?,
                    exit_price: row.get(8)?,
                    close_reason: row.get(9)?,
                    profit_loss: row.get(10)?,
                    session: row.get(11)?,
                    setup_name: row.get(12)?,
                    emotion_note: row.get(13)?,
                    notes: row.get(14)?,
                    before_chart: row.get(15)?,
                    after_chart: row.get(16)?,
                })
            })
            .map_err(query_err)?;

        let mut entries = Vec::new();
        for row in rows {
            let raw = row.map_err(query_err)?;
            let id = raw.id.clone();
            match raw.into_entry() {
                Some(entry) => entries.push(entry),
                None => warn!(collection, id = %id, "skipping malformed trade row"),
            }
        }

        Ok(entries)
    }

    /// Runs after a committed write; read failures are logged, not returned.
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

impl TradeStorePort for SqliteStore {
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, JournalError> {
        let subscription = self.listeners.register(collection, listener.clone())?;
        let snapshot = self.read(collection)?;
        listener(&snapshot);
        Ok(subscription)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        self.listeners.remove(subscription);
    }

    fn create(&self, collection: &str, record: &TradeRecord) -> Result<String, JournalError> {
        let id = Uuid::new_v4().to_string();
        self.upsert(collection, &id, record)?;
        debug!(collection, id = %id, "created trade");
        self.notify(collection);
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, record: &TradeRecord) -> Result<(), JournalError> {
        self.upsert(collection, id, record)?;
        debug!(collection, id, "updated trade");
        self.notify(collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), JournalError> {
        let removed = {
            let conn = self.connection()?;
            conn.execute(
                "DELETE FROM trades WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .map_err(query_err)?
        };
        if removed > 0 {
            debug!(collection, id, "deleted trade");
            self.notify(collection);
        }
        Ok(())
    }

    fn snapshot(&self, collection: &str) -> Result<Vec<TradeEntry>, JournalError> {
        self.read(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn sample_record(date: &str, pnl: Option<f64>) -> TradeRecord {
        let mut record = TradeRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            "XAUUSD",
            Direction::Sell,
            0.5,
            CloseReason::TpHit,
        );
        record.entry_price = Some(1950.0);
        record.stop_loss = Some(1960.0);
        record.take_profit = Some(1940.0);
        record.profit_loss = pnl;
        record.session = "London".into();
        record
    }

    #[test]
    fn from_config_missing_path() {
        let result = SqliteStore::from_config(&EmptyConfig);
        match result {
            Err(JournalError::ConfigMissing { section, key }) => {
                assert_eq!(section, "store");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn from_config_rejects_out_of_range_pool_size() {
        use crate::adapters::file_config_adapter::FileConfigAdapter;

        for size in ["0", "-3", "4294967296"] {
            let config = FileConfigAdapter::from_string(&format!(
                "[store]\npath = :memory:\npool_size = {size}\n"
            ))
            .unwrap();
            match SqliteStore::from_config(&config) {
                Err(JournalError::ConfigInvalid { key, .. }) => assert_eq!(key, "pool_size"),
                Err(other) => panic!("expected ConfigInvalid for {size}, got: {other}"),
                Ok(_) => panic!("expected error for pool_size {size}"),
            }
        }
    }

    #[test]
    fn create_and_read_back() {
        let store = SqliteStore::in_memory().unwrap();
        let record = sample_record("2024-03-01", Some(500.0));
        let id = store.create("tradingJournal/u1", &record).unwrap();

        let entries = store.snapshot("tradingJournal/u1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].record, record);
    }

    #[test]
    fn snapshot_is_date_ordered() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .create("c", &sample_record("2024-03-05", Some(1.0)))
            .unwrap();
        store
            .create("c", &sample_record("2024-03-01", Some(2.0)))
            .unwrap();
        let entries = store.snapshot("c").unwrap();
        assert_eq!(entries[0].record.profit_loss, Some(2.0));
    }

    #[test]
    fn update_replaces_fields() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store
            .create("c", &sample_record("2024-03-01", Some(1.0)))
            .unwrap();
        let mut changed = sample_record("2024-03-01", Some(-20.0));
        changed.notes = "moved stop too early".into();
        store.update("c", &id, &changed).unwrap();

        let entries = store.snapshot("c").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.profit_loss, Some(-20.0));
        assert_eq!(entries[0].record.notes, "moved stop too early");
    }

    #[test]
    fn delete_unknown_id_is_ok() {
        let store = SqliteStore::in_memory().unwrap();
        store.delete("c", "missing").unwrap();
    }

    #[test]
    fn text_profit_loss_is_tolerated() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store
            .create("c", &sample_record("2024-03-01", Some(1.0)))
            .unwrap();
        {
            let conn = store.connection().unwrap();
            conn.execute(
                "UPDATE trades SET profit_loss = 'oops' WHERE id = ?1",
                params![id],
            )
            .unwrap();
        }
        let entries = store.snapshot("c").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.profit_loss, None);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .create("c", &sample_record("2024-03-01", Some(1.0)))
            .unwrap();
        {
            let conn = store.connection().unwrap();
            conn.execute(
                "INSERT INTO trades (collection, id, date, pair, direction, lot_size, close_reason)
                 VALUES ('c', 'bad', 'not a date', 'EURUSD', 'Buy', 1.0, 'TP hit')",
                [],
            )
            .unwrap();
        }
        assert_eq!(store.snapshot("c").unwrap().len(), 1);
    }

    #[test]
    fn listeners_see_writes() {
        let store = SqliteStore::in_memory().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = store
            .subscribe(
                "c",
                Arc::new(move |entries: &[TradeEntry]| sink.lock().unwrap().push(entries.len())),
            )
            .unwrap();

        let id = store
            .create("c", &sample_record("2024-03-01", Some(1.0)))
            .unwrap();
        store.delete("c", &id).unwrap();
        store.unsubscribe(sub);
        store
            .create("c", &sample_record("2024-03-02", Some(1.0)))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn write_succeeds_when_listener_refresh_fails() {
        let store = SqliteStore::in_memory().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store
            .subscribe(
                "c",
                Arc::new(move |entries: &[TradeEntry]| sink.lock().unwrap().push(entries.len())),
            )
            .unwrap();

        let first = store
            .create("c", &sample_record("2024-03-01", Some(1.0)))
            .unwrap();
        {
            let conn = store.connection().unwrap();
            conn.execute(
                "UPDATE trades SET session = x'00ff' WHERE id = ?1",
                params![first],
            )
            .unwrap();
        }

        let second = store.create("c", &sample_record("2024-03-02", Some(2.0)));
        assert!(second.is_ok());
        let count: i64 = store
            .connection()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM trades WHERE collection = 'c'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }
}
