//! Table formatting for journal reports.
//!
//! Provides functions to generate Typst markup for:
//! - Summary statistics table
//! - Win/loss breakdown
//! - Trade log table (date order)

use crate::domain::analytics::{self, SummaryStats, WinLossBreakdown};
use crate::domain::calculator::{format_money, format_price};
use crate::domain::trade::TradeEntry;
use chrono::NaiveDate;

/// Escape characters Typst treats as markup inside `[...]` content blocks.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '[' | ']' | '#' | '*' | '_' | '$' | '@' | '<' | '>' | '`' | '~'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn pnl_cell(value: f64) -> String {
    let color = if value > 0.0 { "green" } else if value < 0.0 { "red" } else { "black" };
    format!("text(fill: {}, [{}])", color, format_money(value))
}

pub fn format_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    analytics::date_range_label(start, end).unwrap_or_else(|| "All dates".to_string())
}

pub fn format_summary_table(summary: &SummaryStats) -> String {
    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 2,\n");
    output.push_str("  align: (left, right),\n");
    output.push_str("  [*Metric*], [*Value*],\n");
    output.push_str(&format!("  [Total Trades], [{}],\n", summary.total_trades));
    output.push_str(&format!("  [Winning Rate], [{}%],\n", summary.win_rate));
    output.push_str(&format!("  [Winning Trades], [{}],\n", summary.winners));
    output.push_str(&format!("  [Losing Trades], [{}],\n", summary.losers));
    output.push_str(&format!("  [Total P&L], {},\n", pnl_cell(summary.total_pnl)));
    output.push_str(&format!(
        "  [Total Profit], [{}],\n",
        format_money(summary.gross_profit)
    ));
    output.push_str(&format!(
        "  [Total Loss], [{}],\n",
        format_money(summary.gross_loss)
    ));
    output.push_str(&format!(
        "  [Profit Factor], [{}],\n",
        summary.profit_factor_display()
    ));
    output.push_str(&format!(
        "  [Average Win], [{}],\n",
        format_money(summary.avg_win)
    ));
    output.push_str(&format!(
        "  [Average Loss], [{}],\n",
        format_money(summary.avg_loss)
    ));
    output.push_str(&format!(
        "  [Break-even Trades], [{}],\n",
        summary.break_even_trades
    ));
    output.push_str(&format!(
        "  [Net Pips], [{}],\n",
        format_price(summary.net_pips)
    ));
    output.push_str(")\n\n");
    output
}

pub fn format_win_loss(breakdown: &WinLossBreakdown) -> String {
    let total = breakdown.winners + breakdown.losers;
    if total == 0 {
        return "_No trades recorded._\n".to_string();
    }

    let share = |n: usize| n as f64 / total as f64 * 100.0;
    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 3,\n");
    output.push_str("  align: (left, right, right),\n");
    output.push_str("  [*Outcome*], [*Trades*], [*Share*],\n");
    output.push_str(&format!(
        "  text(fill: green, [Winners]), [{}], [{:.1}%],\n",
        breakdown.winners,
        share(breakdown.winners)
    ));
    output.push_str(&format!(
        "  text(fill: red, [Losers]), [{}], [{:.1}%],\n",
        breakdown.losers,
        share(breakdown.losers)
    ));
    output.push_str(")\n\n");
    output
}

fn optional_price(value: Option<f64>) -> String {
    value.map(|v| format!("{}", v)).unwrap_or_else(|| "-".into())
}

pub fn format_trade_log(entries: &[TradeEntry]) -> String {
    if entries.is_empty() {
        return "// No trades recorded\n".to_string();
    }

    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 10,\n");
    output.push_str("  [*Date*], [*Pair*], [*Lot*], [*Direction*], [*Entry*], ");
    output.push_str("[*SL*], [*TP*], [*Close Reason*], [*P&L*], [*Emotion*],\n");

    for entry in entries {
        let record = &entry.record;
        let pnl = match record.profit_loss {
            Some(v) => pnl_cell(v),
            None => "[-]".to_string(),
        };
        output.push_str(&format!(
            "  [{}], [{}], [{}], [{}], [{}], [{}], [{}], [{}], {}, [{}],\n",
            record.date.format("%Y-%m-%d"),
            escape(&record.pair),
            record.lot_size,
            record.direction,
            optional_price(record.entry_price),
            optional_price(record.stop_loss),
            optional_price(record.take_profit),
            record.close_reason.label(),
            pnl,
            escape(&record.emotion_note),
        ));
    }

    output.push_str(")\n\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::summary_stats;
    use crate::domain::trade::{CloseReason, Direction, TradeRecord};

    fn entry(id: &str, day: u32, pnl: Option<f64>) -> TradeEntry {
        let mut record = TradeRecord::new(
            NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            "EURUSD",
            Direction::Buy,
            1.0,
            CloseReason::Manual,
        );
        record.entry_price = Some(1.1);
        record.profit_loss = pnl;
        record.emotion_note = "calm #focus".into();
        TradeEntry::new(id, record)
    }

    #[test]
    fn escape_markup_characters() {
        assert_eq!(escape("a*b_c"), "a\\*b\\_c");
        assert_eq!(escape("[x] #1"), "\\[x\\] \\#1");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn summary_table_contents() {
        let entries = vec![entry("a", 1, Some(100.0)), entry("b", 2, Some(-50.0))];
        let table = format_summary_table(&summary_stats(&entries));
        assert!(table.starts_with("#table("));
        assert!(table.contains("[Total Trades], [2]"));
        assert!(table.contains("[Winning Rate], [50%]"));
        assert!(table.contains("[Profit Factor], [2.00]"));
        assert!(table.contains("[Total Loss], [-50.00]"));
    }

    #[test]
    fn summary_table_pips_and_break_even() {
        let mut short = entry("a", 1, Some(30.0));
        short.record.direction = Direction::Sell;
        short.record.exit_price = Some(1.0970);
        let mut flat = entry("b", 2, Some(0.0));
        flat.record.close_reason = CloseReason::BreakEven;
        let table = format_summary_table(&summary_stats(&[short, flat]));
        assert!(table.contains("[Break-even Trades], [1]"));
        assert!(table.contains("[Net Pips], [0.003]"));
    }

    #[test]
    fn summary_table_profit_factor_not_applicable() {
        let entries = vec![entry("a", 1, Some(100.0))];
        let table = format_summary_table(&summary_stats(&entries));
        assert!(table.contains("[Profit Factor], [N/A]"));
    }

    #[test]
    fn win_loss_shares() {
        let table = format_win_loss(&WinLossBreakdown {
            winners: 3,
            losers: 1,
        });
        assert!(table.contains("[3], [75.0%]"));
        assert!(table.contains("[1], [25.0%]"));
        assert!(format_win_loss(&WinLossBreakdown::default()).contains("No trades"));
    }

    #[test]
    fn trade_log_rows() {
        let entries = vec![entry("a", 1, Some(12.5)), entry("b", 2, None)];
        let log = format_trade_log(&entries);
        assert_eq!(log.matches("[2024-04-").count(), 2);
        assert!(log.contains("text(fill: green, [12.50])"));
        assert!(log.contains("[-], [calm \\#focus]"));
        assert!(log.contains("[Manual]"));
    }

    #[test]
    fn date_range_label() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            format_date_range(Some(start), Some(end)),
            "2024-01-01 to 2024-01-31"
        );
        assert_eq!(format_date_range(Some(start), None), "from 2024-01-01");
        assert_eq!(format_date_range(None, Some(end)), "up to 2024-01-31");
        assert_eq!(format_date_range(None, None), "All dates");
    }
}
