//! Derived statistics over a collection of journal entries.
//!
//! Every function here is pure and total: entries without a numeric
//! profit/loss contribute nothing to sums and count as non-winners, so the
//! winner/loser partition always covers the whole input.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::calculator::{self, round2, round_price};
use super::trade::TradeEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_trades: usize,
    pub winners: usize,
    pub losers: usize,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// `None` when there is no loss to divide by.
    pub profit_factor: Option<f64>,
    pub avg_win: f64,
    /// Average of the losing trades; zero or negative.
    pub avg_loss: f64,
    /// Whole percent.
    pub win_rate: u32,
    /// Sum of [`trade_pips`] over trades that have both prices.
    pub net_pips: f64,
    /// Trades closed at break-even, counted apart from the win/loss split.
    pub break_even_trades: usize,
}

impl SummaryStats {
    pub fn profit_factor_display(&self) -> String {
        match self.profit_factor {
            Some(pf) => format!("{:.2}", pf),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinLossBreakdown {
    pub winners: usize,
    pub losers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub cumulative_pnl: f64,
}

/// Raw sums shared by the summary, breakdown and expectancy.
struct Partition {
    winners: usize,
    losers: usize,
    gross_profit: f64,
    gross_loss: f64,
    total_pnl: f64,
}

fn partition(entries: &[TradeEntry]) -> Partition {
    let mut p = Partition {
        winners: 0,
        losers: 0,
        gross_profit: 0.0,
        gross_loss: 0.0,
        total_pnl: 0.0,
    };

    for entry in entries {
        let pnl = entry.pnl_or_zero();
        p.total_pnl += pnl;
        if entry.is_winner() {
            p.winners += 1;
            p.gross_profit += pnl;
        } else {
            p.losers += 1;
            p.gross_loss += pnl;
        }
    }

    p
}

pub fn summary_stats(entries: &[TradeEntry]) -> SummaryStats {
    let p = partition(entries);
    let total_trades = entries.len();

    let profit_factor = if p.gross_loss != 0.0 {
        Some(round2(p.gross_profit / p.gross_loss.abs()))
    } else {
        None
    };

    let avg_win = if p.winners > 0 {
        p.gross_profit / p.winners as f64
    } else {
        0.0
    };

    let avg_loss = if p.losers > 0 {
        p.gross_loss / p.losers as f64
    } else {
        0.0
    };

    let win_rate = if total_trades > 0 {
        (p.winners as f64 / total_trades as f64 * 100.0).round() as u32
    } else {
        0
    };

    let net_pips = entries.iter().filter_map(trade_pips).sum::<f64>();
    let break_even_trades = entries
        .iter()
        .filter(|e| e.record.close_reason.is_break_even())
        .count();

    SummaryStats {
        total_trades,
        winners: p.winners,
        losers: p.losers,
        total_pnl: round2(p.total_pnl),
        gross_profit: round2(p.gross_profit),
        gross_loss: round2(p.gross_loss),
        profit_factor,
        avg_win: round2(avg_win),
        avg_loss: round2(avg_loss),
        win_rate,
        net_pips: round_price(net_pips),
        break_even_trades,
    }
}

/// Pip gain/loss of one trade, using the exit its close reason implies.
pub fn trade_pips(entry: &TradeEntry) -> Option<f64> {
    let r = &entry.record;
    let exit = calculator::exit_price_for(r.close_reason, r.take_profit, r.stop_loss, r.exit_price);
    calculator::pip_gain_loss(r.direction, r.entry_price, exit)
}

pub fn win_loss_breakdown(entries: &[TradeEntry]) -> WinLossBreakdown {
    let p = partition(entries);
    WinLossBreakdown {
        winners: p.winners,
        losers: p.losers,
    }
}

/// Expected profit/loss per trade.
pub fn expectancy(entries: &[TradeEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let p = partition(entries);
    let total = entries.len() as f64;

    let avg_win = if p.winners > 0 {
        p.gross_profit / p.winners as f64
    } else {
        0.0
    };
    let avg_loss = if p.losers > 0 {
        p.gross_loss / p.losers as f64
    } else {
        0.0
    };

    let win_fraction = p.winners as f64 / total;
    let loss_fraction = p.losers as f64 / total;
    round2(win_fraction * avg_win - loss_fraction * avg_loss.abs())
}

/// One point per distinct date, ascending, carrying the running total.
pub fn daily_cumulative_pnl(entries: &[TradeEntry]) -> Vec<CumulativePoint> {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in entries {
        *daily.entry(entry.date()).or_insert(0.0) += entry.pnl_or_zero();
    }

    let mut cumulative = 0.0;
    daily
        .into_iter()
        .map(|(date, pnl)| {
            cumulative += pnl;
            CumulativePoint {
                date,
                cumulative_pnl: round2(cumulative),
            }
        })
        .collect()
}

/// Sort by date, then id so equal dates have a stable order.
pub fn sort_by_date(entries: &mut [TradeEntry]) {
    entries.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id.cmp(&b.id)));
}

/// Entries whose date lies within the inclusive range. Open bounds match everything.
pub fn filter_by_date_range(
    entries: &[TradeEntry],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<TradeEntry> {
    entries
        .iter()
        .filter(|e| start.is_none_or(|s| e.date() >= s))
        .filter(|e| end.is_none_or(|d| e.date() <= d))
        .cloned()
        .collect()
}

/// Human label for an inclusive date filter; `None` when neither bound is set.
pub fn date_range_label(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{} to {}", fmt(s), fmt(e))),
        (Some(s), None) => Some(format!("from {}", fmt(s))),
        (None, Some(e)) => Some(format!("up to {}", fmt(e))),
        (None, None) => None,
    }
}

/// The `n` most recent entries, newest first.
pub fn recent(entries: &[TradeEntry], n: usize) -> Vec<&TradeEntry> {
    let mut refs: Vec<&TradeEntry> = entries.iter().collect();
    refs.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.id.cmp(&a.id)));
    refs.truncate(n);
    refs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeGroup {
    Session,
    DayOfWeek,
    Pair,
    Setup,
}

impl TradeGroup {
    fn key(self, entry: &TradeEntry) -> Option<String> {
        let raw = match self {
            TradeGroup::Session => entry.record.session.trim().to_string(),
            TradeGroup::DayOfWeek => entry.record.weekday().to_string(),
            TradeGroup::Pair => entry.record.pair.trim().to_uppercase(),
            TradeGroup::Setup => entry.record.setup_name.trim().to_string(),
        };
        if raw.is_empty() { None } else { Some(raw) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub label: String,
    pub trades: usize,
    pub pnl: f64,
}

/// Summed profit/loss per group label, in label order. Entries without a label are skipped.
pub fn group_totals(entries: &[TradeEntry], group: TradeGroup) -> Vec<GroupTotal> {
    let mut totals: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for entry in entries {
        if let Some(label) = group.key(entry) {
            let slot = totals.entry(label).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += entry.pnl_or_zero();
        }
    }

    totals
        .into_iter()
        .map(|(label, (trades, pnl))| GroupTotal {
            label,
            trades,
            pnl: round2(pnl),
        })
        .collect()
}

/// The group with the highest summed profit/loss. Ties go to the first label.
pub fn most_profitable_by(entries: &[TradeEntry], group: TradeGroup) -> Option<GroupTotal> {
    group_totals(entries, group)
        .into_iter()
        .reduce(|best, next| if next.pnl > best.pnl { next } else { best })
}

pub fn trades_per_day(entries: &[TradeEntry]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.date()).or_insert(0) += 1;
    }
    counts
}

/// Calendar heatmap intensity: 0 (no trades) to 4 (six or more).
pub fn heat_level(count: usize) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2..=3 => 2,
        4..=5 => 3,
        _ => 4,
    }
}
