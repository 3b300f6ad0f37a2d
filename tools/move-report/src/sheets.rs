//! Mapping between workbook sheets and engine models.

use move_engine::chart::{FeverChart, WorkExecutionChart};
use move_engine::normalize;
use move_engine::types::{InboundConfig, InboundHistoricItem, InboundWorkItem};
use move_engine::{Config, HistoricWorkItem, ProgressLog, ProgressLogEntry, WorkItem};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::workbook::{Sheet, Workbook};

pub const CONFIG_SHEET: &str = "MOVE_Configuration";
pub const HISTORIC_SHEET: &str = "Historic_Work_Items";
pub const CURRENT_SHEET: &str = "Current_Work_Items";
pub const PROGRESS_LOG_SHEET: &str = "Progress_Log";
pub const WORK_EXECUTION_CHART_SHEET: &str = "Work_Execution_Chart";
pub const FEVER_CHART_SHEET: &str = "Fever_Chart";
pub const INSTRUCTIONS_SHEET: &str = "Instructions";

pub const CONFIG_COLUMNS: [&str; 2] = ["Parameter", "Value"];

pub const HISTORIC_COLUMNS: [&str; 5] = [
  "Historical_WI_ID",
  "Description",
  "Actual_Start_Date",
  "Actual_Completion_Date",
  "Flow_Time_Days",
];
const HISTORIC_REQUIRED: [&str; 4] = [
  "Historical_WI_ID",
  "Actual_Start_Date",
  "Actual_Completion_Date",
  "Flow_Time_Days",
];

pub const CURRENT_COLUMNS: [&str; 7] = [
  "Work_Item_ID",
  "Description",
  "Commitment_Date",
  "Status",
  "Actual_Start_Date",
  "Actual_Completion_Date",
  "Date_Withdrawn",
];
const CURRENT_REQUIRED: [&str; 4] = [
  "Work_Item_ID",
  "Status",
  "Actual_Start_Date",
  "Actual_Completion_Date",
];

pub const PROGRESS_LOG_COLUMNS: [&str; 11] = [
  "Snapshot_Date",
  "Scope_At_Snapshot",
  "Actual_Work_Completed",
  "Elapsed_Time_Days",
  "Actual_Operational_Throughput",
  "Current_50th_Percentile_Flow_Time",
  "Forecasted_Delivery_Date",
  "Buffer_Consumption_Percentage",
  "Work_Done_Percentage",
  "Current_Buffer_Signal",
  "Fever_Chart_Signal",
];

/// Typed inputs read from the workbook.
#[derive(Debug, Clone)]
pub struct Inputs {
  pub config: Config,
  pub historic: Vec<HistoricWorkItem>,
  pub current: Vec<WorkItem>,
}

/// Read and validate configuration and both work-item tables.
pub fn read_inputs(workbook: &Workbook) -> Result<Inputs, ReportError> {
  let config = read_config(workbook)?;
  debug!(?config, "configuration loaded");

  let historic_sheet = workbook.sheet(HISTORIC_SHEET)?;
  historic_sheet.require_columns(&HISTORIC_REQUIRED)?;
  let current_sheet = workbook.sheet(CURRENT_SHEET)?;
  current_sheet.require_columns(&CURRENT_REQUIRED)?;

  let historic = typed_records::<InboundHistoricItem>(historic_sheet)?
    .iter()
    .map(|(row, r)| normalize::normalize_historic_item(*row, r))
    .collect::<Result<Vec<_>, _>>()?;
  let current = typed_records::<InboundWorkItem>(current_sheet)?
    .iter()
    .map(|(row, r)| normalize::normalize_work_item(*row, r))
    .collect::<Result<Vec<_>, _>>()?;

  info!(
    historic = historic.len(),
    current = current.len(),
    "read and validated workbook inputs"
  );
  Ok(Inputs {
    config,
    historic,
    current,
  })
}

/// Parameter/Value rows into a validated configuration.
pub fn read_config(workbook: &Workbook) -> Result<Config, ReportError> {
  let sheet = workbook.sheet(CONFIG_SHEET)?;
  sheet.require_columns(&CONFIG_COLUMNS)?;

  let mut params = Map::new();
  for (_, record) in sheet.records()? {
    let Some(name) = record.get("parameter").and_then(normalize::parse_text) else {
      continue;
    };
    let value = record.get("value").cloned().unwrap_or(Value::Null);
    params.insert(name.to_ascii_lowercase(), value);
  }

  let raw: InboundConfig = serde_json::from_value(Value::Object(params))?;
  Ok(normalize::normalize_config(&raw)?)
}

/// Records deserialized into `T`, each with its sheet row number.
fn typed_records<T: DeserializeOwned>(sheet: &Sheet) -> Result<Vec<(usize, T)>, ReportError> {
  sheet
    .records()?
    .into_iter()
    .map(|(row, r)| -> Result<(usize, T), ReportError> {
      Ok((row, serde_json::from_value(Value::Object(r))?))
    })
    .collect()
}

/// Replace the progress log sheet with `log`.
pub fn write_progress_log(workbook: &mut Workbook, log: &ProgressLog) {
  let mut sheet = Sheet::new(PROGRESS_LOG_SHEET, &PROGRESS_LOG_COLUMNS);
  for entry in log.iter() {
    sheet.push_row(progress_row(entry));
  }
  workbook.upsert(sheet);
  info!(rows = log.len(), "updated '{}' sheet", PROGRESS_LOG_SHEET);
}

/// One progress log entry as sheet cells, in `PROGRESS_LOG_COLUMNS` order.
pub fn progress_row(entry: &ProgressLogEntry) -> Vec<Value> {
  vec![
    json!(entry.snapshot_date.format("%Y-%m-%d").to_string()),
    json!(entry.scope_at_snapshot),
    json!(entry.actual_work_completed),
    json!(entry.elapsed_time_days),
    json!(entry.actual_operational_throughput),
    json!(entry.current_50th_percentile_flow_time),
    entry
      .forecasted_delivery_date
      .map(|f| json!(f.format("%Y-%m-%dT%H:%M:%S").to_string()))
      .unwrap_or(Value::Null),
    json!(entry.buffer_consumption_percentage),
    json!(entry.work_done_percentage),
    json!(entry.current_buffer_signal.label()),
    json!(entry.fever_chart_signal.label()),
  ]
}

/// Store both charts' data in their sheets.
pub fn write_charts(
  workbook: &mut Workbook,
  work_execution: &WorkExecutionChart,
  fever: &FeverChart,
) -> Result<(), ReportError> {
  workbook.upsert(Sheet::with_data(
    WORK_EXECUTION_CHART_SHEET,
    serde_json::to_value(work_execution)?,
  ));
  workbook.upsert(Sheet::with_data(FEVER_CHART_SHEET, serde_json::to_value(fever)?));
  info!("inserted chart data into workbook");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::template::build_template;
  use chrono::NaiveDate;

  fn template() -> Workbook {
    build_template(NaiveDate::from_ymd_opt(2025, 10, 17).unwrap()).unwrap()
  }

  fn current_sheet(wb: &mut Workbook) -> &mut Sheet {
    wb.sheets
      .iter_mut()
      .find(|s| s.name == CURRENT_SHEET)
      .unwrap()
  }

  #[test]
  fn errors_name_the_sheet_row_past_blank_rows() {
    let mut wb = template();
    let sheet = current_sheet(&mut wb);
    sheet.rows.insert(0, vec![Value::Null; CURRENT_COLUMNS.len()]);
    // Data row 2: WI-001 after the blank row.
    sheet.rows[1][5] = json!("2025-13-40");

    let err = read_inputs(&wb).unwrap_err();
    assert!(
      err.to_string().contains("actual_completion_date[2]"),
      "{}",
      err
    );
  }

  #[test]
  fn blank_id_defaults_to_sheet_row() {
    let mut wb = template();
    let sheet = current_sheet(&mut wb);
    sheet.rows.insert(1, vec![json!("")]);
    sheet.rows[3][0] = Value::Null;

    let inputs = read_inputs(&wb).unwrap();
    assert_eq!(inputs.current.len(), 8);
    assert_eq!(inputs.current[2].id, "row-4");
  }

  #[test]
  fn progress_row_matches_columns() {
    let log: ProgressLog = serde_json::from_value(json!([{
      "snapshot_date": "2025-01-21",
      "scope_at_snapshot": 4,
      "actual_work_completed": 4,
      "elapsed_time_days": 21,
      "actual_operational_throughput": 0.2,
      "current_50th_percentile_flow_time": 5.0,
      "forecasted_delivery_date": null,
      "buffer_consumption_percentage": 0.0,
      "work_done_percentage": 1.0,
      "current_buffer_signal": "green",
      "fever_chart_signal": "beyond_red"
    }]))
    .unwrap();
    let row = progress_row(log.last().unwrap());
    assert_eq!(row.len(), PROGRESS_LOG_COLUMNS.len());
    assert!(row[6].is_null());
    assert_eq!(row[10], "Beyond Red");
  }
}
