//! Command-line entrypoint for workbook reports.
//!
//! ```bash
//! # Scaffold a workbook with sample data
//! move-report --workbook tracker.json --create-template
//!
//! # Refresh the progress log and charts as of a date
//! move-report --workbook tracker.json --snapshot-date 2025-01-21 --csv log.csv
//! ```

use std::io;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use move_engine::normalize;
use move_report::error::ReportError;
use move_report::{generate, summary_line, template, ReportOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "move-report")]
#[command(about = "MOVE forecast reports for a tracking workbook")]
#[command(version)]
struct Args {
  /// Tracking workbook (JSON)
  #[arg(long, visible_alias = "excel-path")]
  workbook: PathBuf,

  /// Write a new workbook with sample data and exit
  #[arg(long)]
  create_template: bool,

  /// Replace an existing workbook when creating a template
  #[arg(long, requires = "create_template")]
  overwrite: bool,

  /// Snapshot date (YYYY-MM-DD)
  #[arg(long)]
  snapshot_date: Option<String>,

  /// Do not rewrite the Progress_Log sheet
  #[arg(long)]
  no_data_update: bool,

  /// Do not store chart data
  #[arg(long)]
  no_chart_insertion: bool,

  /// Also export the progress log as CSV
  #[arg(long)]
  csv: Option<PathBuf>,

  /// Log level when RUST_LOG is unset (case-insensitive)
  #[arg(
    long,
    default_value = "INFO",
    ignore_case = true,
    value_parser = ["TRACE", "DEBUG", "INFO", "WARN", "WARNING", "ERROR", "CRITICAL"]
  )]
  log_level: String,
}

fn main() {
  let args = Args::parse();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_level(&args.log_level))),
    )
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run(&args) {
    eprintln!("move-report: {}", e);
    std::process::exit(1);
  }
}

/// `--log-level` spelling to a filter directive.
fn filter_level(level: &str) -> String {
  match level.to_ascii_lowercase().as_str() {
    "warning" => "warn".to_string(),
    "critical" => "error".to_string(),
    other => other.to_string(),
  }
}

fn run(args: &Args) -> Result<(), ReportError> {
  if args.create_template {
    let today = Local::now().date_naive();
    template::create_template(&args.workbook, args.overwrite, today)?;
    println!("created template {}", args.workbook.display());
    return Ok(());
  }

  let raw = args.snapshot_date.as_deref().ok_or_else(|| {
    ReportError::Usage("--snapshot-date is required unless --create-template is given".into())
  })?;
  let options = ReportOptions {
    workbook: args.workbook.clone(),
    snapshot_date: normalize::parse_snapshot_date(raw)?,
    update_log: !args.no_data_update,
    insert_charts: !args.no_chart_insertion,
    csv: args.csv.clone(),
  };

  let report = generate(&options)?;
  match report.progress_log.last() {
    Some(last) => println!("{}", summary_line(last)),
    None => println!("{}: no progress log entries", report.snapshot_date),
  }
  Ok(())
}
