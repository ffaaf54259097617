//! Per-trade calculators: profit/loss, pip gain/loss and risk:reward.

use std::fmt;

use super::trade::{CloseReason, Direction};

/// Contract size for gold: one lot is 100 ounces.
pub const GOLD_MULTIPLIER: f64 = 100.0;
/// Contract size for standard forex pairs.
pub const FOREX_MULTIPLIER: f64 = 100_000.0;

pub fn contract_multiplier(pair: &str) -> f64 {
    if pair.trim().eq_ignore_ascii_case("XAUUSD") {
        GOLD_MULTIPLIER
    } else {
        FOREX_MULTIPLIER
    }
}

/// Realized profit/loss in account currency, or `None` if an input is missing.
pub fn profit_loss(
    lot_size: Option<f64>,
    direction: Option<Direction>,
    entry_price: Option<f64>,
    exit_price: Option<f64>,
    pair: &str,
) -> Option<f64> {
    let lot = lot_size?;
    let entry = entry_price?;
    let exit = exit_price?;
    let direction = direction?;
    if pair.trim().is_empty() {
        return None;
    }

    let move_in_favour = match direction {
        Direction::Buy => exit - entry,
        Direction::Sell => entry - exit,
    };
    Some(move_in_favour * lot * contract_multiplier(pair))
}

/// Price distance moved in the trade's favour: `exit - entry` for buys,
/// `entry - exit` for sells. Not scaled by lot size or contract.
pub fn pip_gain_loss(
    direction: Direction,
    entry_price: Option<f64>,
    exit_price: Option<f64>,
) -> Option<f64> {
    let entry = entry_price?;
    let exit = exit_price?;
    Some(match direction {
        Direction::Buy => exit - entry,
        Direction::Sell => entry - exit,
    })
}

/// The price a trade is assumed to have exited at for its close reason.
///
/// Target and stop closes use the planned levels; every other reason uses the
/// recorded exit price. Break-even closes have no automatic exit.
pub fn exit_price_for(
    close_reason: CloseReason,
    take_profit: Option<f64>,
    stop_loss: Option<f64>,
    exit_price: Option<f64>,
) -> Option<f64> {
    match close_reason {
        CloseReason::TpHit => take_profit,
        CloseReason::SlHit => stop_loss,
        CloseReason::BeHit | CloseReason::BreakEven => None,
        CloseReason::Manual | CloseReason::Win | CloseReason::Loss | CloseReason::WinWithPartial => {
            exit_price
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskReward {
    Ratio(f64),
    NotApplicable,
}

impl fmt::Display for RiskReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskReward::Ratio(r) => write!(f, "{:.2}", r),
            RiskReward::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// `|take_profit - entry| / |entry - stop_loss|`.
pub fn risk_reward(
    entry_price: Option<f64>,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
) -> RiskReward {
    let (Some(entry), Some(stop), Some(target)) = (entry_price, stop_loss, take_profit) else {
        return RiskReward::NotApplicable;
    };
    let risk = (entry - stop).abs();
    if risk == 0.0 {
        return RiskReward::NotApplicable;
    }
    RiskReward::Ratio((target - entry).abs() / risk)
}

/// Round to cents. Negative zero is normalized so it never prints as "-0.00".
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

pub fn format_money(value: f64) -> String {
    format!("{:.2}", round2(value))
}

/// Round to five decimals, the finest quote precision in use.
pub fn round_price(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0 + 0.0
}

/// Price distance with up to five decimals and never fewer than two.
pub fn format_price(value: f64) -> String {
    let mut text = format!("{:.5}", round_price(value));
    while text.ends_with('0') && text.len() - text.find('.').unwrap_or(text.len()) > 3 {
        text.pop();
    }
    text
}
