//! Spreadsheet export: trade log plus a summary sheet as CSV files.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::calculator::{format_money, format_price};
use crate::domain::error::JournalError;
use crate::domain::trade::TradeEntry;
use crate::ports::report_port::{JournalReport, ReportPort};

#[derive(Debug, Default)]
pub struct CsvExportAdapter;

#[derive(Serialize)]
struct TradeRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Pair")]
    pair: &'a str,
    #[serde(rename = "Lot Size")]
    lot_size: f64,
    #[serde(rename = "Direction")]
    direction: String,
    #[serde(rename = "Entry Price")]
    entry_price: Option<f64>,
    #[serde(rename = "Stop Loss")]
    stop_loss: Option<f64>,
    #[serde(rename = "Take Profit")]
    take_profit: Option<f64>,
    #[serde(rename = "Close Reason")]
    close_reason: &'static str,
    #[serde(rename = "Profit/Loss")]
    profit_loss: Option<String>,
    #[serde(rename = "Emotion Note")]
    emotion_note: &'a str,
}

impl<'a> From<&'a TradeEntry> for TradeRow<'a> {
    fn from(entry: &'a TradeEntry) -> Self {
        let r = &entry.record;
        TradeRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            pair: &r.pair,
            lot_size: r.lot_size,
            direction: r.direction.to_string(),
            entry_price: r.entry_price,
            stop_loss: r.stop_loss,
            take_profit: r.take_profit,
            close_reason: r.close_reason.label(),
            profit_loss: r.profit_loss.map(format_money),
            emotion_note: &r.emotion_note,
        }
    }
}

fn csv_err(e: csv::Error) -> JournalError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => JournalError::Io(io),
        other => JournalError::store(format!("csv export failed: {other:?}")),
    }
}

/// `<dir>/<stem>_summary.csv` next to the trade log.
pub fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output.with_file_name(format!("{stem}_summary.csv"))
}

/// Summary rows in display order.
pub fn summary_rows(report: &JournalReport) -> Vec<(String, String)> {
    let s = &report.summary;
    let mut rows = vec![
        ("Total Trades".to_string(), s.total_trades.to_string()),
        ("Winning Rate".to_string(), format!("{}%", s.win_rate)),
        ("Winning Trades".to_string(), s.winners.to_string()),
        ("Losing Trades".to_string(), s.losers.to_string()),
        ("Total Profit".to_string(), format_money(s.gross_profit)),
        ("Total Loss".to_string(), format_money(s.gross_loss)),
        ("Break-even Trades".to_string(), s.break_even_trades.to_string()),
        ("Net Pips".to_string(), format_price(s.net_pips)),
    ];
    if let Some(label) = report.range_label() {
        rows.push(("Date Range".to_string(), label));
    }
    rows
}

impl ReportPort for CsvExportAdapter {
    fn write(&self, report: &JournalReport, output_path: &str) -> Result<(), JournalError> {
        let output = Path::new(output_path);

        let mut log = csv::Writer::from_path(output).map_err(csv_err)?;
        if report.entries.is_empty() {
            log.write_record([
                "Date",
                "Pair",
                "Lot Size",
                "Direction",
                "Entry Price",
                "Stop Loss",
                "Take Profit",
                "Close Reason",
                "Profit/Loss",
                "Emotion Note",
            ])
            .map_err(csv_err)?;
        }
        for entry in &report.entries {
            log.serialize(TradeRow::from(entry)).map_err(csv_err)?;
        }
        log.flush()?;

        let summary_file = summary_path(output);
        let mut summary = csv::Writer::from_path(&summary_file).map_err(csv_err)?;
        summary.write_record(["Metric", "Value"]).map_err(csv_err)?;
        for (metric, value) in summary_rows(report) {
            summary.write_record([metric, value]).map_err(csv_err)?;
        }
        summary.flush()?;

        info!(
            log = output_path,
            summary = %summary_file.display(),
            trades = report.entries.len(),
            "wrote csv export"
        );
        Ok(())
    }
}
