//! Trade entry form: a mutable draft with derived fields and create-or-update submission.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

use super::calculator::{self, RiskReward};
use super::error::JournalError;
use super::trade::{CloseReason, Direction, TradeEntry, TradeRecord, parse_date, parse_decimal};
use crate::ports::store_port::TradeStorePort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Pair,
    Direction,
    LotSize,
    EntryPrice,
    StopLoss,
    TakeProfit,
    ExitPrice,
    CloseReason,
    ProfitLoss,
    Session,
    SetupName,
    EmotionNote,
    Notes,
    BeforeChart,
    AfterChart,
}

impl FormField {
    fn affects_profit_loss(self) -> bool {
        matches!(
            self,
            FormField::Pair
                | FormField::Direction
                | FormField::LotSize
                | FormField::EntryPrice
                | FormField::StopLoss
                | FormField::TakeProfit
                | FormField::ExitPrice
                | FormField::CloseReason
        )
    }

    fn affects_risk_reward(self) -> bool {
        matches!(
            self,
            FormField::EntryPrice | FormField::StopLoss | FormField::TakeProfit
        )
    }
}

/// Raw form inputs as typed by the user, plus the derived `rr` display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeDraft {
    pub date: String,
    pub pair: String,
    pub direction: String,
    pub lot_size: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub exit_price: String,
    pub close_reason: String,
    pub profit_loss: String,
    pub rr: String,
    pub session: String,
    pub setup_name: String,
    pub emotion_note: String,
    pub notes: String,
    pub before_chart: String,
    pub after_chart: String,
}

fn price_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl TradeDraft {
    pub fn from_record(record: &TradeRecord) -> Self {
        let mut draft = TradeDraft {
            date: record.date.format("%Y-%m-%d").to_string(),
            pair: record.pair.clone(),
            direction: record.direction.to_string(),
            lot_size: record.lot_size.to_string(),
            entry_price: price_text(record.entry_price),
            stop_loss: price_text(record.stop_loss),
            take_profit: price_text(record.take_profit),
            exit_price: price_text(record.exit_price),
            close_reason: record.close_reason.to_string(),
            profit_loss: record
                .profit_loss
                .map(calculator::format_money)
                .unwrap_or_default(),
            rr: String::new(),
            session: record.session.clone(),
            setup_name: record.setup_name.clone(),
            emotion_note: record.emotion_note.clone(),
            notes: record.notes.clone(),
            before_chart: record.before_chart.clone(),
            after_chart: record.after_chart.clone(),
        };
        draft.rr = draft.risk_reward().to_string();
        draft
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Date => &self.date,
            FormField::Pair => &self.pair,
            FormField::Direction => &self.direction,
            FormField::LotSize => &self.lot_size,
            FormField::EntryPrice => &self.entry_price,
            FormField::StopLoss => &self.stop_loss,
            FormField::TakeProfit => &self.take_profit,
            FormField::ExitPrice => &self.exit_price,
            FormField::CloseReason => &self.close_reason,
            FormField::ProfitLoss => &self.profit_loss,
            FormField::Session => &self.session,
            FormField::SetupName => &self.setup_name,
            FormField::EmotionNote => &self.emotion_note,
            FormField::Notes => &self.notes,
            FormField::BeforeChart => &self.before_chart,
            FormField::AfterChart => &self.after_chart,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Date => &mut self.date,
            FormField::Pair => &mut self.pair,
            FormField::Direction => &mut self.direction,
            FormField::LotSize => &mut self.lot_size,
            FormField::EntryPrice => &mut self.entry_price,
            FormField::StopLoss => &mut self.stop_loss,
            FormField::TakeProfit => &mut self.take_profit,
            FormField::ExitPrice => &mut self.exit_price,
            FormField::CloseReason => &mut self.close_reason,
            FormField::ProfitLoss => &mut self.profit_loss,
            FormField::Session => &mut self.session,
            FormField::SetupName => &mut self.setup_name,
            FormField::EmotionNote => &mut self.emotion_note,
            FormField::Notes => &mut self.notes,
            FormField::BeforeChart => &mut self.before_chart,
            FormField::AfterChart => &mut self.after_chart,
        }
    }

    pub fn risk_reward(&self) -> RiskReward {
        calculator::risk_reward(
            parse_decimal(&self.entry_price),
            parse_decimal(&self.stop_loss),
            parse_decimal(&self.take_profit),
        )
    }

    /// Profit/loss derived from the current inputs, if they are complete.
    pub fn computed_profit_loss(&self) -> Option<f64> {
        let reason = self.close_reason.parse::<CloseReason>().ok()?;
        let exit = calculator::exit_price_for(
            reason,
            parse_decimal(&self.take_profit),
            parse_decimal(&self.stop_loss),
            parse_decimal(&self.exit_price),
        );
        calculator::profit_loss(
            parse_decimal(&self.lot_size),
            self.direction.parse::<Direction>().ok(),
            parse_decimal(&self.entry_price),
            exit,
            &self.pair,
        )
    }

    fn required_price(&self, field: &str, raw: &str) -> Result<f64, JournalError> {
        if raw.trim().is_empty() {
            return Err(JournalError::validation(field, "is required"));
        }
        parse_decimal(raw).ok_or_else(|| JournalError::validation(field, "must be a number"))
    }

    /// Validate the draft and build the record to store.
    fn to_record(&self, today: NaiveDate, pnl_manual: bool) -> Result<TradeRecord, JournalError> {
        let pair = self.pair.trim();
        if pair.is_empty() {
            return Err(JournalError::validation("pair", "is required"));
        }
        if self.direction.trim().is_empty() {
            return Err(JournalError::validation("direction", "is required"));
        }
        let direction = self
            .direction
            .parse::<Direction>()
            .map_err(|_| JournalError::validation("direction", "must be Buy or Sell"))?;

        let lot_size = self.required_price("lot size", &self.lot_size)?;
        if lot_size <= 0.0 {
            return Err(JournalError::validation("lot size", "must be positive"));
        }
        let entry_price = self.required_price("entry price", &self.entry_price)?;
        let stop_loss = self.required_price("stop loss", &self.stop_loss)?;
        let take_profit = self.required_price("take profit", &self.take_profit)?;

        let exit_price = if self.exit_price.trim().is_empty() {
            None
        } else {
            Some(
                parse_decimal(&self.exit_price)
                    .ok_or_else(|| JournalError::validation("exit price", "must be a number"))?,
            )
        };

        if self.close_reason.trim().is_empty() {
            return Err(JournalError::validation("close reason", "is required"));
        }
        let close_reason = self
            .close_reason
            .parse::<CloseReason>()
            .map_err(|_| JournalError::validation("close reason", "is not a known reason"))?;

        let date = if self.date.trim().is_empty() {
            today
        } else {
            parse_date(&self.date)
                .ok_or_else(|| JournalError::validation("date", "is not a valid date"))?
        };

        let entered_pnl = if self.profit_loss.trim().is_empty() {
            None
        } else {
            Some(
                parse_decimal(&self.profit_loss)
                    .ok_or_else(|| JournalError::validation("profit/loss", "must be a number"))?,
            )
        };
        let profit_loss = if pnl_manual {
            Some(entered_pnl.unwrap_or(0.0))
        } else {
            // Keep a previously stored value when the inputs cannot derive one.
            self.computed_profit_loss()
                .map(calculator::round2)
                .or(entered_pnl)
        };

        Ok(TradeRecord {
            date,
            pair: pair.to_string(),
            direction,
            lot_size,
            entry_price: Some(entry_price),
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            exit_price,
            close_reason,
            profit_loss,
            session: self.session.trim().to_string(),
            setup_name: self.setup_name.trim().to_string(),
            emotion_note: self.emotion_note.clone(),
            notes: self.notes.clone(),
            before_chart: self.before_chart.trim().to_string(),
            after_chart: self.after_chart.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Editing,
    Submitting,
}

pub struct FormController {
    store: Arc<dyn TradeStorePort>,
    collection: String,
    draft: TradeDraft,
    state: FormState,
    editing_id: Option<String>,
    /// Set while profit/loss is hand-entered; automatic recalculation never touches it then.
    pnl_manual: bool,
    last_error: Option<String>,
}

impl FormController {
    pub fn new(store: Arc<dyn TradeStorePort>, collection: impl Into<String>) -> Self {
        FormController {
            store,
            collection: collection.into(),
            draft: TradeDraft::default(),
            state: FormState::Idle,
            editing_id: None,
            pnl_manual: false,
            last_error: None,
        }
    }

    pub fn draft(&self) -> &TradeDraft {
        &self.draft
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn is_pnl_manual(&self) -> bool {
        self.pnl_manual
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), JournalError> {
        if field == FormField::ProfitLoss && !self.pnl_manual {
            return Err(JournalError::validation(
                "profit/loss",
                "is calculated automatically unless the trade closed at break-even",
            ));
        }

        *self.draft.field_mut(field) = value.to_string();
        self.state = FormState::Editing;

        if field == FormField::CloseReason {
            let break_even = value
                .parse::<CloseReason>()
                .map(CloseReason::is_break_even)
                .unwrap_or(false);
            if break_even && !self.pnl_manual {
                self.pnl_manual = true;
                self.draft.profit_loss = calculator::format_money(0.0);
            } else if !break_even {
                self.pnl_manual = false;
            }
        }

        if !self.pnl_manual && field.affects_profit_loss() {
            self.draft.profit_loss = self
                .draft
                .computed_profit_loss()
                .map(calculator::format_money)
                .unwrap_or_default();
        }

        if field.affects_risk_reward() {
            self.draft.rr = self.draft.risk_reward().to_string();
        }

        Ok(())
    }

    /// Load an existing entry; the next submit updates it instead of creating.
    pub fn load_for_edit(&mut self, entry: &TradeEntry) {
        self.draft = TradeDraft::from_record(&entry.record);
        self.editing_id = Some(entry.id.clone());
        self.pnl_manual = entry.record.close_reason.is_break_even();
        self.state = FormState::Editing;
        self.last_error = None;
    }

    /// Discard the draft and any edit in progress.
    pub fn cancel(&mut self) {
        self.reset();
    }

    pub fn submit(&mut self) -> Result<String, JournalError> {
        self.submit_on(chrono::Local::now().date_naive())
    }

    /// Submit, stamping `today` on drafts without a date. Returns the stored id.
    pub fn submit_on(&mut self, today: NaiveDate) -> Result<String, JournalError> {
        self.state = FormState::Submitting;

        let result = self
            .draft
            .to_record(today, self.pnl_manual)
            .and_then(|record| match &self.editing_id {
                Some(id) => {
                    debug!(id = %id, collection = %self.collection, "updating trade");
                    self.store
                        .update(&self.collection, id, &record)
                        .map(|()| id.clone())
                }
                None => {
                    debug!(collection = %self.collection, "creating trade");
                    self.store.create(&self.collection, &record)
                }
            });

        match result {
            Ok(id) => {
                self.reset();
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, "trade submission failed");
                self.state = FormState::Editing;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn reset(&mut self) {
        self.draft = TradeDraft::default();
        self.editing_id = None;
        self.pnl_manual = false;
        self.state = FormState::Idle;
        self.last_error = None;
    }
}
