//! Typst journal report generation.
//!
//! Reads a Typst template (either the built-in default or a custom file via
//! `[report] template_path`), resolves all `{{PLACEHOLDER}}` markers using
//! helpers from `chart_svg` and `tables`, and writes the final `.typ` file.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::domain::analytics;
use crate::domain::error::JournalError;
use crate::ports::report_port::{JournalReport, ReportPort};

pub struct TypstReportAdapter {
    template_path: Option<PathBuf>,
}

impl TypstReportAdapter {
    pub fn new(template_path: Option<PathBuf>) -> Self {
        Self { template_path }
    }

    fn load_template(&self) -> Result<String, JournalError> {
        match &self.template_path {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => Ok(default_template::template().to_string()),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(&self, report: &JournalReport, output_path: &str) -> Result<(), JournalError> {
        let template = self.load_template()?;
        let content = resolve(&template, report);
        fs::write(output_path, content)?;
        info!(path = output_path, trades = report.entries.len(), "wrote typst report");
        Ok(())
    }
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup.
pub fn resolve(template: &str, report: &JournalReport) -> String {
    let mut output = template.to_string();

    output = output.replace("{{TITLE}}", &tables::escape(&report.title));
    output = output.replace("{{DATE_RANGE}}", &tables::format_date_range(report.start, report.end));

    let summary = tables::format_summary_table(&report.summary);
    output = output.replace("{{SUMMARY_TABLE}}", &summary);

    let daily = analytics::daily_cumulative_pnl(&report.entries);
    let svg = chart_svg::generate_cumulative_svg(&daily);
    let chart = if svg.is_empty() {
        "_No P&L data._".to_string()
    } else {
        format!(
            "#image.decode(\n\"{}\",\n  width: 100%,\n)",
            svg.replace('\\', "\\\\").replace('"', "\\\"")
        )
    };
    output = output.replace("{{CUMULATIVE_CHART}}", &chart);

    let breakdown = analytics::win_loss_breakdown(&report.entries);
    output = output.replace("{{WIN_LOSS}}", &tables::format_win_loss(&breakdown));

    output = output.replace("{{TRADE_LOG}}", &tables::format_trade_log(&report.entries));

    output
}
