//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use crate::adapters::csv_export::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::local_auth::LocalAuth;
use crate::adapters::memory_store::MemoryStore;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::analytics::{self, TradeGroup};
use crate::domain::calculator::{self, format_money, format_price};
use crate::domain::error::JournalError;
use crate::domain::form::{FormController, FormField};
use crate::domain::journal::{JournalSession, JournalView};
use crate::domain::trade::{Direction, TradeEntry, parse_date, parse_decimal};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::{JournalReport, ReportPort};
use crate::ports::store_port::TradeStorePort;

const DEFAULT_REPORT_TITLE: &str = "Trading Journal Report";

#[derive(Parser, Debug)]
#[command(name = "tradejournal", about = "Personal trading journal and analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a new trade
    Add {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        fields: TradeFields,
    },
    /// Change fields of an existing trade
    Edit {
        id: String,
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        fields: TradeFields,
    },
    /// Delete a trade
    Delete {
        id: String,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List trades, newest first
    List {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show summary statistics
    Stats {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Trades per day with heatmap intensity
    Calendar {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Write a Typst report or a CSV export
    Report {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Typst)]
        format: ReportFormat,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Risk:reward ratio for a planned trade
    Rr {
        #[arg(long)]
        entry: String,
        #[arg(long)]
        stop: String,
        #[arg(long)]
        target: String,
    },
    /// Profit/loss for a closed position
    Pnl {
        #[arg(long)]
        lot: String,
        #[arg(long)]
        direction: String,
        #[arg(long)]
        entry: String,
        #[arg(long)]
        exit: String,
        #[arg(long)]
        pair: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Typst,
    Csv,
}

/// Trade form inputs. Only the flags given are written to the form.
#[derive(Args, Debug, Default, Clone)]
pub struct TradeFields {
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub pair: Option<String>,
    #[arg(long)]
    pub direction: Option<String>,
    #[arg(long)]
    pub lot: Option<String>,
    #[arg(long)]
    pub entry: Option<String>,
    #[arg(long)]
    pub stop: Option<String>,
    #[arg(long)]
    pub target: Option<String>,
    #[arg(long)]
    pub exit: Option<String>,
    #[arg(long)]
    pub close_reason: Option<String>,
    /// Only accepted for break-even closes
    #[arg(long, allow_hyphen_values = true)]
    pub pnl: Option<String>,
    #[arg(long)]
    pub session: Option<String>,
    #[arg(long)]
    pub setup: Option<String>,
    #[arg(long)]
    pub emotion: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub before_chart: Option<String>,
    #[arg(long)]
    pub after_chart: Option<String>,
}

impl TradeFields {
    /// Given fields in the order they must be applied: prices before the
    /// close reason, and the close reason before a manual profit/loss.
    pub fn assignments(&self) -> Vec<(FormField, &str)> {
        [
            (FormField::Date, &self.date),
            (FormField::Pair, &self.pair),
            (FormField::Direction, &self.direction),
            (FormField::LotSize, &self.lot),
            (FormField::EntryPrice, &self.entry),
            (FormField::StopLoss, &self.stop),
            (FormField::TakeProfit, &self.target),
            (FormField::ExitPrice, &self.exit),
            (FormField::CloseReason, &self.close_reason),
            (FormField::ProfitLoss, &self.pnl),
            (FormField::Session, &self.session),
            (FormField::SetupName, &self.setup),
            (FormField::EmotionNote, &self.emotion),
            (FormField::Notes, &self.notes),
            (FormField::BeforeChart, &self.before_chart),
            (FormField::AfterChart, &self.after_chart),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Add { config, fields } => run_add(&config, &fields),
        Command::Edit { id, config, fields } => run_edit(&config, &id, &fields),
        Command::Delete { id, config } => run_delete(&config, &id),
        Command::List { config, limit } => run_list(&config, limit),
        Command::Stats { config, start, end } => {
            run_stats(&config, start.as_deref(), end.as_deref())
        }
        Command::Calendar { config, start, end } => {
            run_calendar(&config, start.as_deref(), end.as_deref())
        }
        Command::Report {
            config,
            format,
            output,
            start,
            end,
        } => run_report(&config, format, &output, start.as_deref(), end.as_deref()),
        Command::Rr {
            entry,
            stop,
            target,
        } => run_rr(&entry, &stop, &target),
        Command::Pnl {
            lot,
            direction,
            entry,
            exit,
            pair,
        } => run_pnl(&lot, &direction, &entry, &exit, &pair),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second call (tests, repeated runs in one process) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, JournalError> {
    let config = FileConfigAdapter::from_file(path)?;
    let level = config
        .get_string("log", "level")
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level);
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &dyn ConfigPort) -> Result<Arc<dyn TradeStorePort>, JournalError> {
    use crate::adapters::sqlite_store::SqliteStore;
    Ok(Arc::new(SqliteStore::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &dyn ConfigPort) -> Result<Arc<dyn TradeStorePort>, JournalError> {
    Err(JournalError::ConfigInvalid {
        section: "store".into(),
        key: "backend".into(),
        reason: "sqlite feature is required for the sqlite backend".into(),
    })
}

/// Trade store selected by `[store] backend` (default `sqlite`).
pub fn open_store(config: &dyn ConfigPort) -> Result<Arc<dyn TradeStorePort>, JournalError> {
    let backend = config
        .get_string("store", "backend")
        .unwrap_or_else(|| "sqlite".to_string());
    match backend.trim().to_lowercase().as_str() {
        "sqlite" => open_sqlite(config),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(JournalError::ConfigInvalid {
            section: "store".into(),
            key: "backend".into(),
            reason: format!("unknown backend '{other}' (expected sqlite or memory)"),
        }),
    }
}

/// Open the configured user's journal on the configured store.
pub fn open_journal(config: &dyn ConfigPort) -> Result<JournalSession, JournalError> {
    let store = open_store(config)?;
    let auth = LocalAuth::from_config(config)?;
    JournalSession::open(store, &auth)
}

pub fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, JournalError> {
    value
        .map(|v| {
            parse_date(v).ok_or_else(|| JournalError::Parse {
                field: field.to_string(),
                value: v.to_string(),
            })
        })
        .transpose()
}

fn parse_number(field: &str, value: &str) -> Result<f64, JournalError> {
    parse_decimal(value).ok_or_else(|| JournalError::Parse {
        field: field.to_string(),
        value: value.to_string(),
    })
}

pub fn apply_fields(form: &mut FormController, fields: &TradeFields) -> Result<(), JournalError> {
    for (field, value) in fields.assignments() {
        form.set_field(field, value)?;
    }
    Ok(())
}

fn print_form_preview(form: &FormController) {
    let draft = form.draft();
    if !draft.rr.is_empty() {
        eprintln!("Risk:Reward  {}", draft.rr);
    }
    if !draft.profit_loss.is_empty() {
        eprintln!("Profit/Loss  {}", draft.profit_loss);
    }
}

fn run_add(config_path: &Path, fields: &TradeFields) -> Result<(), JournalError> {
    let config = load_config(config_path)?;
    let session = open_journal(&config)?;
    let mut form = session.form();
    apply_fields(&mut form, fields)?;
    print_form_preview(&form);
    let id = form.submit()?;
    println!("created {id}");
    Ok(())
}

fn run_edit(config_path: &Path, id: &str, fields: &TradeFields) -> Result<(), JournalError> {
    let config = load_config(config_path)?;
    let session = open_journal(&config)?;
    let mut form = session.edit_form(id)?;
    apply_fields(&mut form, fields)?;
    print_form_preview(&form);
    let id = form.submit()?;
    println!("updated {id}");
    Ok(())
}

fn run_delete(config_path: &Path, id: &str) -> Result<(), JournalError> {
    let config = load_config(config_path)?;
    let session = open_journal(&config)?;
    session.delete(id)?;
    println!("deleted {id}");
    Ok(())
}

fn format_pnl(entry: &TradeEntry) -> String {
    entry
        .profit_loss()
        .map(format_money)
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_entry_line(entry: &TradeEntry) -> String {
    let r = &entry.record;
    format!(
        "{}  {}  {:<8} {:<4} {:>6}  {:<16} {:>10}  {}",
        entry.id,
        r.date.format("%Y-%m-%d"),
        r.pair,
        r.direction,
        r.lot_size,
        r.close_reason.label(),
        format_pnl(entry),
        r.setup_name,
    )
}

fn run_list(config_path: &Path, limit: Option<usize>) -> Result<(), JournalError> {
    let config = load_config(config_path)?;
    let session = open_journal(&config)?;
    let view = session.view();
    let rows = analytics::recent(&view.entries, limit.unwrap_or(view.entries.len()));
    if rows.is_empty() {
        println!("No trades recorded.");
        return Ok(());
    }
    for entry in rows {
        println!("{}", format_entry_line(entry));
    }
    Ok(())
}

/// Human-readable statistics block for `view`.
pub fn format_stats(view: &JournalView) -> String {
    let s = &view.summary;
    let mut out = String::new();
    out.push_str(&format!("Total Trades:     {}\n", s.total_trades));
    out.push_str(&format!("Winning Rate:     {}%\n", s.win_rate));
    out.push_str(&format!("Winning Trades:   {}\n", s.winners));
    out.push_str(&format!("Losing Trades:    {}\n", s.losers));
    out.push_str(&format!("Total P&L:        {}\n", format_money(s.total_pnl)));
    out.push_str(&format!("Total Profit:     {}\n", format_money(s.gross_profit)));
    out.push_str(&format!("Total Loss:       {}\n", format_money(s.gross_loss)));
    out.push_str(&format!("Profit Factor:    {}\n", s.profit_factor_display()));
    out.push_str(&format!("Average Win:      {}\n", format_money(s.avg_win)));
    out.push_str(&format!("Average Loss:     {}\n", format_money(s.avg_loss)));
    out.push_str(&format!("Expectancy:       {}\n", format_money(view.expectancy)));
    out.push_str(&format!("Break-even:       {}\n", s.break_even_trades));
    out.push_str(&format!("Net Pips:         {}\n", format_price(s.net_pips)));

    for (label, group) in [
        ("Best Session", TradeGroup::Session),
        ("Best Day", TradeGroup::DayOfWeek),
        ("Best Pair", TradeGroup::Pair),
        ("Best Setup", TradeGroup::Setup),
    ] {
        if let Some(best) = analytics::most_profitable_by(&view.entries, group) {
            out.push_str(&format!(
                "{:<18}{} ({}, {} trades)\n",
                format!("{label}:"),
                best.label,
                format_money(best.pnl),
                best.trades
            ));
        }
    }
    out
}

fn filtered_view(view: JournalView, start: Option<NaiveDate>, end: Option<NaiveDate>) -> JournalView {
    if start.is_none() && end.is_none() {
        return view;
    }
    JournalView::from_snapshot(&analytics::filter_by_date_range(&view.entries, start, end))
}

/// Statistics restricted to `[start, end]`, headed by the range when one is set.
pub fn format_stats_in_range(
    view: JournalView,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> String {
    let mut out = String::new();
    if let Some(label) = analytics::date_range_label(start, end) {
        out.push_str(&format!("Date Range:       {label}\n"));
    }
    out.push_str(&format_stats(&filtered_view(view, start, end)));
    out
}

fn run_stats(config_path: &Path, start: Option<&str>, end: Option<&str>) -> Result<(), JournalError> {
    let start = parse_optional_date("start", start)?;
    let end = parse_optional_date("end", end)?;
    let config = load_config(config_path)?;
    let session = open_journal(&config)?;
    print!("{}", format_stats_in_range(session.view(), start, end));
    Ok(())
}

fn run_calendar(
    config_path: &Path,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(), JournalError> {
    let start = parse_optional_date("start", start)?;
    let end = parse_optional_date("end", end)?;
    let config = load_config(config_path)?;
    let session = open_journal(&config)?;
    let view = filtered_view(session.view(), start, end);
    for (date, count) in analytics::trades_per_day(&view.entries) {
        println!(
            "{}  {:>3}  {}",
            date.format("%Y-%m-%d"),
            count,
            "#".repeat(analytics::heat_level(count) as usize)
        );
    }
    Ok(())
}

/// Report writer for `format`, honouring `[report] template_path` for Typst.
pub fn report_adapter(format: ReportFormat, config: &dyn ConfigPort) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Typst => Box::new(TypstReportAdapter::new(
            config.get_string("report", "template_path").map(PathBuf::from),
        )),
        ReportFormat::Csv => Box::new(CsvExportAdapter),
    }
}

fn run_report(
    config_path: &Path,
    format: ReportFormat,
    output: &Path,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(), JournalError> {
    let start = parse_optional_date("start", start)?;
    let end = parse_optional_date("end", end)?;
    let config = load_config(config_path)?;
    let session = open_journal(&config)?;

    let title = config
        .get_string("report", "title")
        .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());
    let report = JournalReport::build(title, &session.view().entries, start, end);

    let output_str = output.to_string_lossy();
    report_adapter(format, &config).write(&report, &output_str)?;
    eprintln!("Report written to {}", output.display());
    Ok(())
}

fn run_rr(entry: &str, stop: &str, target: &str) -> Result<(), JournalError> {
    init_logging("warn");
    let rr = calculator::risk_reward(
        parse_decimal(entry),
        parse_decimal(stop),
        parse_decimal(target),
    );
    println!("{rr}");
    Ok(())
}

fn run_pnl(lot: &str, direction: &str, entry: &str, exit: &str, pair: &str) -> Result<(), JournalError> {
    init_logging("warn");
    let lot = parse_number("lot", lot)?;
    let direction = direction.parse::<Direction>()?;
    let entry = parse_number("entry", entry)?;
    let exit = parse_number("exit", exit)?;
    if pair.trim().is_empty() {
        return Err(JournalError::validation("pair", "is required"));
    }
    let pnl = calculator::profit_loss(Some(lot), Some(direction), Some(entry), Some(exit), pair)
        .ok_or_else(|| JournalError::validation("pair", "is required"))?;
    println!("{}", format_money(pnl));
    Ok(())
}
