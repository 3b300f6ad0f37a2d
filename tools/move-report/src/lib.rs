//! MOVE tracking workbook reports.
//!
//! Reads configuration and work items from a JSON workbook, runs the
//! forecast engine, and writes the progress log and chart data back.

pub mod error;
pub mod export;
pub mod sheets;
pub mod template;
pub mod workbook;

use std::path::PathBuf;

use chrono::NaiveDate;
use move_engine::{chart, Engine, ProgressLogEntry, Report};
use tracing::{info, warn};

use crate::error::ReportError;
use crate::workbook::Workbook;

/// What a report run reads and writes.
#[derive(Debug, Clone)]
pub struct ReportOptions {
  pub workbook: PathBuf,
  pub snapshot_date: NaiveDate,
  /// Replace the `Progress_Log` sheet.
  pub update_log: bool,
  /// Store chart data in the chart sheets.
  pub insert_charts: bool,
  pub csv: Option<PathBuf>,
}

/// Run the engine over the workbook and write the requested outputs.
///
/// Nothing is written when inputs fail validation. An empty log leaves the
/// workbook untouched.
pub fn generate(options: &ReportOptions) -> Result<Report, ReportError> {
  let mut workbook = Workbook::load(&options.workbook)?;
  let inputs = sheets::read_inputs(&workbook)?;
  let engine = Engine::new(inputs.config);
  let report = engine.run(&inputs.historic, &inputs.current, options.snapshot_date)?;
  let log = &report.progress_log;

  if log.is_empty() {
    warn!("progress log is empty; skipping workbook update and charts");
  } else {
    let mut changed = false;
    if options.update_log {
      sheets::write_progress_log(&mut workbook, log);
      changed = true;
    }
    if options.insert_charts {
      let config = engine.config();
      let charts = chart::work_execution(log, config, options.snapshot_date)
        .zip(chart::fever(log, config, options.snapshot_date));
      if let Some((work_execution, fever)) = charts {
        sheets::write_charts(&mut workbook, &work_execution, &fever)?;
        changed = true;
      }
    }
    if changed {
      workbook.save(&options.workbook)?;
      info!(path = %options.workbook.display(), "saved workbook");
    }
  }

  if let Some(path) = &options.csv {
    export::export_csv(log, path)?;
  }
  Ok(report)
}

/// One-line status for the latest entry.
pub fn summary_line(entry: &ProgressLogEntry) -> String {
  let forecast = entry
    .forecasted_delivery_date
    .map(|f| f.date().to_string())
    .unwrap_or_else(|| "none".to_string());
  format!(
    "{}: {}/{} done, forecast {}, buffer {:.0}% ({}), fever {}",
    entry.snapshot_date,
    entry.actual_work_completed,
    entry.scope_at_snapshot,
    forecast,
    entry.buffer_consumption_percentage * 100.0,
    entry.current_buffer_signal,
    entry.fever_chart_signal,
  )
}
