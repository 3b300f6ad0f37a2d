//! Core types for the forecast engine (JSON contracts + internal models).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: loosely typed cells, resolved by `normalize`)
// ---------------------------------------------------------------------------

/// Raw configuration values. Cells may be strings, numbers or null; unknown
/// parameters (e.g. derived spreadsheet rows) are silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundConfig {
  #[serde(default)]
  pub planned_start_date: Value,
  #[serde(default)]
  pub planned_delivery_date: Value,
  #[serde(default)]
  pub buffer_green_date: Value,
  #[serde(default)]
  pub buffer_yellow_date: Value,
  #[serde(default)]
  pub buffer_red_date: Value,
  #[serde(default)]
  pub buffer_beyond_red_date: Value,
  #[serde(default)]
  pub fever_green_yellow_left_y: Value,
  #[serde(default)]
  pub fever_green_yellow_right_y: Value,
  #[serde(default)]
  pub fever_yellow_red_left_y: Value,
  #[serde(default)]
  pub fever_yellow_red_right_y: Value,
  #[serde(default)]
  pub historic_50th_percentile_flow_time_override: Value,
}

/// One row of the current work-item table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundWorkItem {
  #[serde(default)]
  pub work_item_id: Value,
  #[serde(default)]
  pub description: Value,
  #[serde(default)]
  pub commitment_date: Value,
  #[serde(default)]
  pub status: Value,
  #[serde(default)]
  pub actual_start_date: Value,
  #[serde(default)]
  pub actual_completion_date: Value,
  #[serde(default)]
  pub date_withdrawn: Value,
}

/// One row of the historic work-item table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundHistoricItem {
  #[serde(default)]
  pub historical_wi_id: Value,
  #[serde(default)]
  pub description: Value,
  #[serde(default)]
  pub actual_start_date: Value,
  #[serde(default)]
  pub actual_completion_date: Value,
  #[serde(default)]
  pub flow_time_days: Value,
}

/// Full request accepted by the `move-engine` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundRequest {
  pub config: InboundConfig,
  #[serde(default)]
  pub historic_items: Vec<InboundHistoricItem>,
  #[serde(default)]
  pub current_items: Vec<InboundWorkItem>,
  pub snapshot_date: String,
}

// ---------------------------------------------------------------------------
// Work items (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
  NotStarted,
  InProgress,
  Completed,
  /// Any other label found in the source table, kept verbatim.
  Other(String),
}

impl WorkStatus {
  /// Case, spacing and separator insensitive: "In Progress", "in_progress", "INPROGRESS".
  pub fn from_str_loose(s: &str) -> Self {
    let key: String = s
      .chars()
      .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
      .collect::<String>()
      .to_ascii_lowercase();
    match key.as_str() {
      "notstarted" => Self::NotStarted,
      "inprogress" => Self::InProgress,
      "completed" => Self::Completed,
      _ => Self::Other(s.trim().to_string()),
    }
  }

  pub fn label(&self) -> &str {
    match self {
      Self::NotStarted => "Not Started",
      Self::InProgress => "In Progress",
      Self::Completed => "Completed",
      Self::Other(s) => s,
    }
  }
}

/// A work item of the project being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
  pub id: String,
  pub description: String,
  /// Items without a commitment date never count toward scope.
  pub commitment_date: Option<NaiveDate>,
  pub status: WorkStatus,
  pub actual_start_date: Option<NaiveDate>,
  pub actual_completion_date: Option<NaiveDate>,
  pub date_withdrawn: Option<NaiveDate>,
}

impl WorkItem {
  /// Committed on or before `date` and not withdrawn on or before it.
  pub fn in_scope_on(&self, date: NaiveDate) -> bool {
    let committed = matches!(self.commitment_date, Some(c) if c <= date);
    let withdrawn = matches!(self.date_withdrawn, Some(w) if w <= date);
    committed && !withdrawn
  }

  pub fn completed_by(&self, date: NaiveDate) -> bool {
    self.status == WorkStatus::Completed
      && matches!(self.actual_completion_date, Some(c) if c <= date)
  }

  /// Inclusive day count from start to completion.
  pub fn flow_time_days(&self) -> Option<i64> {
    match (self.actual_start_date, self.actual_completion_date) {
      (Some(start), Some(done)) => Some(inclusive_days(start, done)),
      _ => None,
    }
  }

  /// Every date on which this item can change scope or completion counts.
  pub fn event_dates(&self) -> impl Iterator<Item = NaiveDate> {
    [
      self.commitment_date,
      self.actual_start_date,
      self.actual_completion_date,
      self.date_withdrawn,
    ]
    .into_iter()
    .flatten()
  }
}

/// A finished item from past projects; only its flow time is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricWorkItem {
  pub id: String,
  pub description: String,
  pub actual_start_date: Option<NaiveDate>,
  pub actual_completion_date: Option<NaiveDate>,
  pub flow_time_days: Option<f64>,
}

/// `end - start + 1`: the start day counts as day one.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
  (end - start).num_days() + 1
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Project health, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferSignal {
  Green,
  Yellow,
  Red,
  BeyondRed,
}

impl BufferSignal {
  pub fn label(self) -> &'static str {
    match self {
      Self::Green => "Green",
      Self::Yellow => "Yellow",
      Self::Red => "Red",
      Self::BeyondRed => "Beyond Red",
    }
  }
}

impl fmt::Display for BufferSignal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

/// Where the baseline flow time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
  Override,
  Historic,
  /// No usable historic samples; the fixed default was used.
  Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowTimeBaseline {
  pub days: f64,
  pub source: BaselineSource,
}

/// One row of the progress log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLogEntry {
  pub snapshot_date: NaiveDate,
  pub scope_at_snapshot: u32,
  pub actual_work_completed: u32,
  /// Inclusive of the planned start day.
  pub elapsed_time_days: i64,
  pub actual_operational_throughput: f64,
  pub current_50th_percentile_flow_time: f64,
  /// Absent when fewer than two regression points exist or the trend is flat/declining.
  pub forecasted_delivery_date: Option<NaiveDateTime>,
  pub buffer_consumption_percentage: f64,
  pub work_done_percentage: f64,
  pub current_buffer_signal: BufferSignal,
  /// Zone of (work done, buffer consumption) on the fever chart.
  pub fever_chart_signal: BufferSignal,
}

/// Chronologically ordered progress log, one entry per event date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressLog {
  pub entries: Vec<ProgressLogEntry>,
}

impl ProgressLog {
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn last(&self) -> Option<&ProgressLogEntry> {
    self.entries.last()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ProgressLogEntry> {
    self.entries.iter()
  }
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub snapshot_date: NaiveDate,
  pub baseline: FlowTimeBaseline,
  pub progress_log: ProgressLog,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for a rejected request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn item() -> WorkItem {
    WorkItem {
      id: "WI-001".into(),
      description: String::new(),
      commitment_date: Some(d(2025, 1, 1)),
      status: WorkStatus::Completed,
      actual_start_date: Some(d(2025, 1, 1)),
      actual_completion_date: Some(d(2025, 1, 5)),
      date_withdrawn: None,
    }
  }

  #[test]
  fn status_parsing_is_loose() {
    assert_eq!(WorkStatus::from_str_loose("In Progress"), WorkStatus::InProgress);
    assert_eq!(WorkStatus::from_str_loose("not_started"), WorkStatus::NotStarted);
    assert_eq!(WorkStatus::from_str_loose(" COMPLETED "), WorkStatus::Completed);
    assert_eq!(
      WorkStatus::from_str_loose("Blocked"),
      WorkStatus::Other("Blocked".into())
    );
  }

  #[test]
  fn withdrawal_day_is_out_of_scope() {
    let wi = WorkItem {
      date_withdrawn: Some(d(2025, 1, 13)),
      ..item()
    };
    assert!(wi.in_scope_on(d(2025, 1, 12)));
    assert!(!wi.in_scope_on(d(2025, 1, 13)));
  }

  #[test]
  fn uncommitted_item_never_in_scope() {
    let wi = WorkItem {
      commitment_date: None,
      ..item()
    };
    assert!(!wi.in_scope_on(d(2030, 1, 1)));
  }

  #[test]
  fn completion_requires_status_and_date() {
    let wi = item();
    assert!(!wi.completed_by(d(2025, 1, 4)));
    assert!(wi.completed_by(d(2025, 1, 5)));

    let in_progress = WorkItem {
      status: WorkStatus::InProgress,
      ..item()
    };
    assert!(!in_progress.completed_by(d(2025, 1, 9)));
  }

  #[test]
  fn flow_time_is_inclusive() {
    assert_eq!(item().flow_time_days(), Some(5));
  }

  #[test]
  fn signals_order_by_severity() {
    assert!(BufferSignal::Green < BufferSignal::Yellow);
    assert!(BufferSignal::Red < BufferSignal::BeyondRed);
    assert_eq!(BufferSignal::BeyondRed.to_string(), "Beyond Red");
    assert_eq!(
      serde_json::to_string(&BufferSignal::BeyondRed).unwrap(),
      "\"beyond_red\""
    );
  }
}
