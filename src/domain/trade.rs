//! Trade records as logged in the journal.

use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

use super::error::JournalError;

/// Accepted date layouts, ISO first.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "Buy"),
            Direction::Sell => write!(f, "Sell"),
        }
    }
}

impl FromStr for Direction {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" | "long" => Ok(Direction::Buy),
            "sell" | "short" => Ok(Direction::Sell),
            _ => Err(JournalError::Parse {
                field: "direction".into(),
                value: s.to_string(),
            }),
        }
    }
}

/// Why a trade was closed.
///
/// Older journal pages recorded a `result` instead of a close reason; those
/// spellings parse into the same enum so one schema covers both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    TpHit,
    SlHit,
    BeHit,
    Manual,
    Win,
    Loss,
    BreakEven,
    WinWithPartial,
}

impl CloseReason {
    pub const ALL: [CloseReason; 8] = [
        CloseReason::TpHit,
        CloseReason::SlHit,
        CloseReason::BeHit,
        CloseReason::Manual,
        CloseReason::Win,
        CloseReason::Loss,
        CloseReason::BreakEven,
        CloseReason::WinWithPartial,
    ];

    /// Break-even closes take a hand-entered profit/loss.
    pub fn is_break_even(self) -> bool {
        matches!(self, CloseReason::BeHit | CloseReason::BreakEven)
    }

    pub fn label(self) -> &'static str {
        match self {
            CloseReason::TpHit => "TP hit",
            CloseReason::SlHit => "SL hit",
            CloseReason::BeHit => "BE hit",
            CloseReason::Manual => "Manual",
            CloseReason::Win => "Win",
            CloseReason::Loss => "Loss",
            CloseReason::BreakEven => "BE",
            CloseReason::WinWithPartial => "Win with Partial",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CloseReason {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "tp hit" | "tp" | "take profit" => Ok(CloseReason::TpHit),
            "sl hit" | "sl" | "stop loss" => Ok(CloseReason::SlHit),
            "be hit" => Ok(CloseReason::BeHit),
            "manual" => Ok(CloseReason::Manual),
            "win" => Ok(CloseReason::Win),
            "loss" => Ok(CloseReason::Loss),
            "be" | "break even" | "breakeven" => Ok(CloseReason::BreakEven),
            "win with partial" | "partial" => Ok(CloseReason::WinWithPartial),
            _ => Err(JournalError::Parse {
                field: "close reason".into(),
                value: s.to_string(),
            }),
        }
    }
}

/// Parse a user-entered decimal. Blank or non-numeric input yields `None`.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an ISO or locale date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// The fields of a trade, without the store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub pair: String,
    pub direction: Direction,
    pub lot_size: f64,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub exit_price: Option<f64>,
    pub close_reason: CloseReason,
    pub profit_loss: Option<f64>,
    pub session: String,
    pub setup_name: String,
    pub emotion_note: String,
    pub notes: String,
    pub before_chart: String,
    pub after_chart: String,
}

impl TradeRecord {
    /// A record with only the required fields set.
    pub fn new(
        date: NaiveDate,
        pair: impl Into<String>,
        direction: Direction,
        lot_size: f64,
        close_reason: CloseReason,
    ) -> Self {
        TradeRecord {
            date,
            pair: pair.into(),
            direction,
            lot_size,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            exit_price: None,
            close_reason,
            profit_loss: None,
            session: String::new(),
            setup_name: String::new(),
            emotion_note: String::new(),
            notes: String::new(),
            before_chart: String::new(),
            after_chart: String::new(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeEntry {
    pub id: String,
    pub record: TradeRecord,
}

impl TradeEntry {
    pub fn new(id: impl Into<String>, record: TradeRecord) -> Self {
        TradeEntry {
            id: id.into(),
            record,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn profit_loss(&self) -> Option<f64> {
        self.record.profit_loss
    }

    /// Profit/loss with missing values counted as zero.
    pub fn pnl_or_zero(&self) -> f64 {
        self.record.profit_loss.unwrap_or(0.0)
    }

    /// Winners are strictly positive; break-even and missing P&L are not.
    pub fn is_winner(&self) -> bool {
        self.pnl_or_zero() > 0.0
    }
}
