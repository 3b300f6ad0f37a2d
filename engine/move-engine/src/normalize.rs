//! Normalize loosely-typed inbound records into validated engine models.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::config::Config;
use crate::error::EngineError;
use crate::types::*;

/// Parse and validate the configuration. Fails on the first bad field.
pub fn normalize_config(raw: &InboundConfig) -> Result<Config, EngineError> {
  let config = Config {
    planned_start_date: required_date("planned_start_date", &raw.planned_start_date)?,
    planned_delivery_date: required_date("planned_delivery_date", &raw.planned_delivery_date)?,
    buffer_green_date: required_date("buffer_green_date", &raw.buffer_green_date)?,
    buffer_yellow_date: required_date("buffer_yellow_date", &raw.buffer_yellow_date)?,
    buffer_red_date: required_date("buffer_red_date", &raw.buffer_red_date)?,
    buffer_beyond_red_date: required_date("buffer_beyond_red_date", &raw.buffer_beyond_red_date)?,
    fever_green_yellow_left_y: required_float(
      "fever_green_yellow_left_y",
      &raw.fever_green_yellow_left_y,
    )?,
    fever_green_yellow_right_y: required_float(
      "fever_green_yellow_right_y",
      &raw.fever_green_yellow_right_y,
    )?,
    fever_yellow_red_left_y: required_float("fever_yellow_red_left_y", &raw.fever_yellow_red_left_y)?,
    fever_yellow_red_right_y: required_float(
      "fever_yellow_red_right_y",
      &raw.fever_yellow_red_right_y,
    )?,
    historic_flow_time_override: parse_float(
      "historic_50th_percentile_flow_time_override",
      &raw.historic_50th_percentile_flow_time_override,
    )
    .map_err(as_configuration)?,
  };
  config.validate()?;
  Ok(config)
}

/// Parse the current work items; errors name the column and row (1-based).
pub fn normalize_work_items(raw: &[InboundWorkItem]) -> Result<Vec<WorkItem>, EngineError> {
  raw
    .iter()
    .enumerate()
    .map(|(i, r)| normalize_work_item(i + 1, r))
    .collect()
}

/// Parse one current work item found at `row` of its source table.
pub fn normalize_work_item(row: usize, r: &InboundWorkItem) -> Result<WorkItem, EngineError> {
  Ok(WorkItem {
    id: parse_text(&r.work_item_id).unwrap_or_else(|| format!("row-{}", row)),
    description: parse_text(&r.description).unwrap_or_default(),
    commitment_date: parse_date(&at("commitment_date", row), &r.commitment_date)?,
    status: parse_text(&r.status)
      .map(|s| WorkStatus::from_str_loose(&s))
      .unwrap_or(WorkStatus::NotStarted),
    actual_start_date: parse_date(&at("actual_start_date", row), &r.actual_start_date)?,
    actual_completion_date: parse_date(
      &at("actual_completion_date", row),
      &r.actual_completion_date,
    )?,
    date_withdrawn: parse_date(&at("date_withdrawn", row), &r.date_withdrawn)?,
  })
}

/// Parse the historic work items.
pub fn normalize_historic_items(
  raw: &[InboundHistoricItem],
) -> Result<Vec<HistoricWorkItem>, EngineError> {
  raw
    .iter()
    .enumerate()
    .map(|(i, r)| normalize_historic_item(i + 1, r))
    .collect()
}

/// Parse one historic item found at `row` of its source table.
///
/// A blank flow time is derived from the dates (inclusive day count) when both are present.
pub fn normalize_historic_item(
  row: usize,
  r: &InboundHistoricItem,
) -> Result<HistoricWorkItem, EngineError> {
  let start = parse_date(&at("actual_start_date", row), &r.actual_start_date)?;
  let done = parse_date(&at("actual_completion_date", row), &r.actual_completion_date)?;
  let flow_time_days = match parse_float(&at("flow_time_days", row), &r.flow_time_days)? {
    Some(days) => Some(days),
    None => match (start, done) {
      (Some(s), Some(c)) => Some(inclusive_days(s, c) as f64),
      _ => None,
    },
  };
  Ok(HistoricWorkItem {
    id: parse_text(&r.historical_wi_id).unwrap_or_else(|| format!("row-{}", row)),
    description: parse_text(&r.description).unwrap_or_default(),
    actual_start_date: start,
    actual_completion_date: done,
    flow_time_days,
  })
}

/// Parse a snapshot date given on the command line or in a request.
pub fn parse_snapshot_date(s: &str) -> Result<NaiveDate, EngineError> {
  parse_date_str(s.trim()).ok_or_else(|| {
    EngineError::validation("snapshot_date", &format!("invalid date '{}': expected YYYY-MM-DD", s))
  })
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Null and whitespace-only strings are blank.
pub fn is_blank(cell: &Value) -> bool {
  match cell {
    Value::Null => true,
    Value::String(s) => s.trim().is_empty(),
    _ => false,
  }
}

/// Text cell; numbers are rendered as written.
pub fn parse_text(cell: &Value) -> Option<String> {
  match cell {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// Date cell: `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DD HH:MM:SS` or RFC 3339.
pub fn parse_date(field: &str, cell: &Value) -> Result<Option<NaiveDate>, EngineError> {
  if is_blank(cell) {
    return Ok(None);
  }
  match cell {
    Value::String(s) => {
      let s = s.trim();
      if s.starts_with('=') {
        return Err(EngineError::validation(field, "unresolved formula"));
      }
      parse_date_str(s)
        .map(Some)
        .ok_or_else(|| EngineError::validation(field, &format!("invalid date '{}'", s)))
    }
    other => Err(EngineError::validation(
      field,
      &format!("expected a date string, got {}", other),
    )),
  }
}

/// Number cell: a JSON number or a numeric string.
pub fn parse_float(field: &str, cell: &Value) -> Result<Option<f64>, EngineError> {
  if is_blank(cell) {
    return Ok(None);
  }
  let value = match cell {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => {
      let s = s.trim();
      if s.starts_with('=') {
        return Err(EngineError::validation(field, "unresolved formula"));
      }
      s.parse::<f64>().ok()
    }
    _ => None,
  };
  match value {
    Some(v) if v.is_finite() => Ok(Some(v)),
    _ => Err(EngineError::validation(
      field,
      &format!("expected a number, got {}", cell),
    )),
  }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(d);
  }
  for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
      return Some(dt.date());
    }
  }
  DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn required_date(field: &str, cell: &Value) -> Result<NaiveDate, EngineError> {
  parse_date(field, cell)
    .map_err(as_configuration)?
    .ok_or_else(|| EngineError::configuration(field, "missing or empty"))
}

fn required_float(field: &str, cell: &Value) -> Result<f64, EngineError> {
  parse_float(field, cell)
    .map_err(as_configuration)?
    .ok_or_else(|| EngineError::configuration(field, "missing or empty"))
}

fn as_configuration(err: EngineError) -> EngineError {
  match err {
    EngineError::Validation { field, reason } => EngineError::Configuration { field, reason },
    other => other,
  }
}

fn at(column: &str, row: usize) -> String {
  format!("{}[{}]", column, row)
}
