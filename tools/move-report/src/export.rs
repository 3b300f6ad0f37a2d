//! CSV export of the progress log.

use std::io::Write;
use std::path::Path;

use move_engine::ProgressLog;
use serde_json::Value;
use tracing::info;

use crate::error::ReportError;
use crate::sheets::{progress_row, PROGRESS_LOG_COLUMNS};

/// Write the log with a header row, one record per entry.
pub fn write_csv<W: Write>(log: &ProgressLog, out: W) -> Result<(), ReportError> {
  let mut writer = csv::Writer::from_writer(out);
  writer.write_record(PROGRESS_LOG_COLUMNS)?;
  for entry in log.iter() {
    writer.write_record(progress_row(entry).iter().map(cell_text))?;
  }
  writer.flush()?;
  Ok(())
}

pub fn export_csv(log: &ProgressLog, path: &Path) -> Result<(), ReportError> {
  let file = std::fs::File::create(path)?;
  write_csv(log, file)?;
  info!(path = %path.display(), rows = log.len(), "exported progress log");
  Ok(())
}

fn cell_text(cell: &Value) -> String {
  match cell {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use move_engine::{BufferSignal, ProgressLogEntry};

  fn entry(day: u32, forecast: bool) -> ProgressLogEntry {
    let date = NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
    ProgressLogEntry {
      snapshot_date: date,
      scope_at_snapshot: 4,
      actual_work_completed: 1,
      elapsed_time_days: day as i64,
      actual_operational_throughput: 0.25,
      current_50th_percentile_flow_time: 4.0,
      forecasted_delivery_date: if forecast {
        date.and_hms_opt(12, 0, 0)
      } else {
        None
      },
      buffer_consumption_percentage: 0.0,
      work_done_percentage: 0.25,
      current_buffer_signal: BufferSignal::BeyondRed,
      fever_chart_signal: BufferSignal::Green,
    }
  }

  #[test]
  fn csv_has_header_and_one_row_per_entry() {
    let log = ProgressLog {
      entries: vec![entry(1, false), entry(4, true)],
    };
    let mut out = Vec::new();
    write_csv(&log, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Snapshot_Date,Scope_At_Snapshot,"));
    assert!(lines[0].ends_with(",Fever_Chart_Signal"));
    assert_eq!(lines[1], "2025-01-01,4,1,1,0.25,4.0,,0.0,0.25,Beyond Red,Green");
    assert!(lines[2].contains(",2025-01-04T12:00:00,"));
  }
}
