//! Point-in-time evaluation of the current work items.

use chrono::NaiveDate;

use crate::flow_time;
use crate::types::{inclusive_days, WorkItem};

/// State of the project as of one date.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
  pub date: NaiveDate,
  pub scope: u32,
  pub completed: u32,
  pub elapsed_days: i64,
  pub throughput: f64,
  pub flow_time_percentile: f64,
}

/// Items committed and not withdrawn as of `date`.
pub fn scope_at(date: NaiveDate, items: &[WorkItem]) -> u32 {
  items.iter().filter(|wi| wi.in_scope_on(date)).count() as u32
}

/// Evaluate scope, completions, throughput and the rolling flow time at `date`.
///
/// The flow time is the median over items completed by `date` once at least two
/// exist. Items without a start date are left out of the median, so one dated
/// item is enough. Before two completions, or when none is dated, it is `baseline`.
pub fn evaluate(date: NaiveDate, start: NaiveDate, items: &[WorkItem], baseline: f64) -> Snapshot {
  let scope = scope_at(date, items);
  let done: Vec<&WorkItem> = items.iter().filter(|wi| wi.completed_by(date)).collect();
  let completed = done.len() as u32;

  let elapsed_days = inclusive_days(start, date);
  let throughput = if elapsed_days > 0 {
    completed as f64 / elapsed_days as f64
  } else {
    0.0
  };

  let flow_time_percentile = if done.len() >= 2 {
    let samples: Vec<f64> = done
      .iter()
      .filter_map(|wi| wi.flow_time_days())
      .map(|days| days as f64)
      .collect();
    flow_time::median(&samples).unwrap_or(baseline)
  } else {
    baseline
  };

  Snapshot {
    date,
    scope,
    completed,
    elapsed_days,
    throughput,
    flow_time_percentile,
  }
}
