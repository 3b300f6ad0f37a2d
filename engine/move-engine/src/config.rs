//! Validated project configuration: planned dates, buffer schedule, fever chart zones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Fully typed MOVE configuration. Built by `normalize::normalize_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  pub planned_start_date: NaiveDate,
  pub planned_delivery_date: NaiveDate,
  /// Forecasts on or before this date are on schedule.
  pub buffer_green_date: NaiveDate,
  pub buffer_yellow_date: NaiveDate,
  pub buffer_red_date: NaiveDate,
  /// End of the buffer; consumption reaches 1.0 here.
  pub buffer_beyond_red_date: NaiveDate,
  /// Green/yellow boundary at 0% work done (fraction of buffer consumed).
  pub fever_green_yellow_left_y: f64,
  /// Green/yellow boundary at 100% work done.
  pub fever_green_yellow_right_y: f64,
  pub fever_yellow_red_left_y: f64,
  pub fever_yellow_red_right_y: f64,
  /// Replaces the median computed from historic items when present.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub historic_flow_time_override: Option<f64>,
}

impl Config {
  /// Buffer dates must be non-decreasing: green <= yellow <= red <= beyond red.
  pub fn validate(&self) -> Result<(), EngineError> {
    let ordered = [
      ("buffer_green_date", self.buffer_green_date),
      ("buffer_yellow_date", self.buffer_yellow_date),
      ("buffer_red_date", self.buffer_red_date),
      ("buffer_beyond_red_date", self.buffer_beyond_red_date),
    ];
    for pair in ordered.windows(2) {
      let (prev_name, prev) = pair[0];
      let (name, date) = pair[1];
      if date < prev {
        return Err(EngineError::configuration(
          name,
          &format!("{} is before {} ({})", date, prev_name, prev),
        ));
      }
    }

    let fever = [
      ("fever_green_yellow_left_y", self.fever_green_yellow_left_y),
      ("fever_green_yellow_right_y", self.fever_green_yellow_right_y),
      ("fever_yellow_red_left_y", self.fever_yellow_red_left_y),
      ("fever_yellow_red_right_y", self.fever_yellow_red_right_y),
    ];
    for (name, value) in fever {
      if !value.is_finite() {
        return Err(EngineError::configuration(name, "must be a finite number"));
      }
    }

    if let Some(v) = self.historic_flow_time_override {
      if !v.is_finite() {
        return Err(EngineError::configuration(
          "historic_50th_percentile_flow_time_override",
          "must be a finite number",
        ));
      }
    }
    Ok(())
  }

  /// Calendar days from the green date to the beyond-red date.
  pub fn buffer_span_days(&self) -> i64 {
    (self.buffer_beyond_red_date - self.buffer_green_date).num_days()
  }
}
