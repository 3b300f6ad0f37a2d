//! Scaffold a new tracking workbook with sample data.
//!
//! Sample values are derived from the item index rather than drawn at
//! random, so the same `today` always yields the same workbook.

use std::path::Path;

use chrono::{Datelike, Days, Months, NaiveDate};
use move_engine::flow_time::{self, DEFAULT_FLOW_TIME_DAYS};
use move_engine::types::inclusive_days;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ReportError;
use crate::sheets::{
  CONFIG_COLUMNS, CONFIG_SHEET, CURRENT_COLUMNS, CURRENT_SHEET, FEVER_CHART_SHEET,
  HISTORIC_COLUMNS, HISTORIC_SHEET, INSTRUCTIONS_SHEET, PROGRESS_LOG_COLUMNS, PROGRESS_LOG_SHEET,
  WORK_EXECUTION_CHART_SHEET,
};
use crate::workbook::{Sheet, Workbook};

const HISTORIC_SAMPLES: u64 = 20;
const CURRENT_SAMPLES: u64 = 8;
/// Items after this index are committed a month after the planned start.
const INITIALLY_COMMITTED: u64 = 6;
/// Share of the ideal completion time given to each buffer zone.
const BUFFER_ZONE_SHARE: f64 = 0.2;

const INSTRUCTIONS: [&str; 6] = [
  "Instructions for using the MOVE Tracker",
  "1. Populate 'Historic_Work_Items' with data from past projects to calculate baseline flow time.",
  "2. Populate 'Current_Work_Items' with the work items for this project.",
  "3. Populate 'MOVE_Configuration' with the project's parameters.",
  "4. Do not delete items from 'Current_Work_Items'. Instead, mark them with a 'Date_Withdrawn'.",
  "5. Run move-report with --snapshot-date to refresh the progress log and charts.",
];

/// Write a fresh template to `path`. An existing file is kept unless `overwrite`.
pub fn create_template(path: &Path, overwrite: bool, today: NaiveDate) -> Result<Workbook, ReportError> {
  if path.exists() && !overwrite {
    return Err(ReportError::AlreadyExists(path.to_path_buf()));
  }
  let workbook = build_template(today)?;
  workbook.save(path)?;
  info!(path = %path.display(), "created workbook template");
  Ok(workbook)
}

/// Template planned from the first day of the month after `today`.
pub fn build_template(today: NaiveDate) -> Result<Workbook, ReportError> {
  let out_of_range = || ReportError::DateOutOfRange(today);

  let planned_start = today
    .with_day(1)
    .and_then(|d| d.checked_add_months(Months::new(1)))
    .ok_or_else(out_of_range)?;
  let next_month = planned_start
    .checked_add_months(Months::new(1))
    .ok_or_else(out_of_range)?;
  let planned_delivery = next_month.pred_opt().ok_or_else(out_of_range)?;

  let mut instructions = Sheet::new(INSTRUCTIONS_SHEET, &["Instructions"]);
  for line in INSTRUCTIONS {
    instructions.push_row(vec![json!(line)]);
  }

  let mut historic = Sheet::new(HISTORIC_SHEET, &HISTORIC_COLUMNS);
  let mut flow_times = Vec::with_capacity(HISTORIC_SAMPLES as usize);
  for i in 1..=HISTORIC_SAMPLES {
    let completion = today
      .checked_sub_days(Days::new(1 + (i * 37) % 365))
      .ok_or_else(out_of_range)?;
    let start = completion
      .checked_sub_days(Days::new(2 + (i * 5) % 9))
      .ok_or_else(out_of_range)?;
    let flow_time_days = inclusive_days(start, completion);
    flow_times.push(flow_time_days as f64);
    historic.push_row(vec![
      json!(format!("HIST-WI-{:03}", i)),
      json!(format!("Sample Historic Work Item {}", i)),
      date_cell(Some(start)),
      date_cell(Some(completion)),
      json!(flow_time_days),
    ]);
  }
  let median = flow_time::median(&flow_times).unwrap_or(DEFAULT_FLOW_TIME_DAYS);

  let mut current = Sheet::new(CURRENT_SHEET, &CURRENT_COLUMNS);
  let mut next_start = planned_start;
  for i in 1..=CURRENT_SAMPLES {
    let commitment = if i <= INITIALLY_COMMITTED {
      planned_start
    } else {
      next_month
    };
    let start = next_start;
    let completion = start
      .checked_add_days(Days::new(2 + (i * 3) % 9))
      .ok_or_else(out_of_range)?;
    next_start = completion;

    let (status, started, completed) = match i {
      1..=3 => ("Completed", Some(start), Some(completion)),
      4 => ("In Progress", Some(start), None),
      _ => ("Not Started", None, None),
    };
    current.push_row(vec![
      json!(format!("WI-{:03}", i)),
      json!(format!("Sample Current Work Item {}", i)),
      date_cell(Some(commitment)),
      json!(status),
      date_cell(started),
      date_cell(completed),
      Value::Null,
    ]);
  }

  let initial_scope = INITIALLY_COMMITTED.min(CURRENT_SAMPLES);
  let ideal = initial_scope as f64 * median;
  let zone = Days::new((BUFFER_ZONE_SHARE * ideal).round() as u64);
  let green = planned_start
    .checked_add_days(Days::new(ideal.round() as u64))
    .ok_or_else(out_of_range)?;
  let yellow = green.checked_add_days(zone).ok_or_else(out_of_range)?;
  let red = yellow.checked_add_days(zone).ok_or_else(out_of_range)?;
  let beyond_red = red.checked_add_days(zone).ok_or_else(out_of_range)?;

  let mut config = Sheet::new(CONFIG_SHEET, &CONFIG_COLUMNS);
  let params: [(&str, Value); 14] = [
    ("Planned_Start_Date", date_cell(Some(planned_start))),
    ("Planned_Delivery_Date", date_cell(Some(planned_delivery))),
    ("Historic_50th_Percentile_Flow_Time", json!(median)),
    ("Historic_50th_Percentile_Flow_Time_Override", Value::Null),
    ("Initial_Scope", json!(initial_scope)),
    ("Initial_Ideal_Completion_Flow_Time", json!(ideal)),
    ("Buffer_Green_Date", date_cell(Some(green))),
    ("Buffer_Yellow_Date", date_cell(Some(yellow))),
    ("Buffer_Red_Date", date_cell(Some(red))),
    ("Buffer_Beyond_Red_Date", date_cell(Some(beyond_red))),
    ("Fever_Green_Yellow_Left_Y", json!(0.2)),
    ("Fever_Green_Yellow_Right_Y", json!(0.5)),
    ("Fever_Yellow_Red_Left_Y", json!(0.5)),
    ("Fever_Yellow_Red_Right_Y", json!(0.8)),
  ];
  for (name, value) in params {
    config.push_row(vec![json!(name), value]);
  }

  Ok(Workbook {
    sheets: vec![
      instructions,
      historic,
      current,
      config,
      Sheet::new(PROGRESS_LOG_SHEET, &PROGRESS_LOG_COLUMNS),
      Sheet::new(WORK_EXECUTION_CHART_SHEET, &[]),
      Sheet::new(FEVER_CHART_SHEET, &[]),
    ],
  })
}

fn date_cell(date: Option<NaiveDate>) -> Value {
  match date {
    Some(d) => json!(d.format("%Y-%m-%d").to_string()),
    None => Value::Null,
  }
}
