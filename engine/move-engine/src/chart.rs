//! Chart data for the work execution (burnup) and fever charts.
//!
//! Only the series are produced here; drawing them is left to the consumer.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::Config;
use crate::regression::{RegressionHistory, Trend};
use crate::types::{BufferSignal, ProgressLog};

/// Extra days added to the trend length. The trend covers `log.len() + 90`
/// calendar days counted from the first snapshot.
pub const TREND_EXTENSION_DAYS: usize = 90;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
  pub date: NaiveDate,
  pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateMarker {
  pub label: String,
  pub date: NaiveDate,
}

/// Least-squares fit over the whole log, as used for the latest forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendFit {
  /// Slope is the velocity in items per day; x is elapsed days from the planned start.
  #[serde(flatten)]
  pub trend: Trend,
  /// Elapsed days at which the trend reaches the current scope.
  pub days_to_completion: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastMarker {
  pub date: NaiveDateTime,
  pub scope: u32,
}

/// Completed vs scope over time, with trend, buffer markers and the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkExecutionChart {
  pub title: String,
  pub completed: Vec<SeriesPoint>,
  pub scope: Vec<SeriesPoint>,
  /// Empty when the log has a single entry.
  pub trend: Vec<SeriesPoint>,
  /// Absent below two distinct snapshots.
  pub trend_fit: Option<TrendFit>,
  pub current_scope: u32,
  pub markers: Vec<DateMarker>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub forecast: Option<ForecastMarker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeverPoint {
  pub work_done: f64,
  pub buffer_consumption: f64,
}

/// A zone band between two straight boundaries over work done 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeverZone {
  pub signal: BufferSignal,
  /// Lower boundary at work done 0 and 1.
  pub lower: [f64; 2],
  /// Upper boundary at work done 0 and 1.
  pub upper: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeverChart {
  pub title: String,
  pub zones: Vec<FeverZone>,
  pub path: Vec<FeverPoint>,
  pub current: FeverPoint,
  pub y_max: f64,
}

pub fn work_execution(
  log: &ProgressLog,
  config: &Config,
  snapshot_date: NaiveDate,
) -> Option<WorkExecutionChart> {
  let last = log.last()?;
  let first = &log.entries[0];

  let completed = log
    .iter()
    .map(|e| SeriesPoint {
      date: e.snapshot_date,
      value: e.actual_work_completed as f64,
    })
    .collect();
  let scope = log
    .iter()
    .map(|e| SeriesPoint {
      date: e.snapshot_date,
      value: e.scope_at_snapshot as f64,
    })
    .collect();

  let mut history = RegressionHistory::new();
  for e in log.iter() {
    history.record(e.elapsed_time_days, e.actual_work_completed);
  }
  let fit = history.fit();
  let trend = match fit {
    Some(t) => (0..log.len() + TREND_EXTENSION_DAYS)
      .filter_map(|i| {
        let date = first.snapshot_date.checked_add_days(Days::new(i as u64))?;
        Some(SeriesPoint {
          date,
          value: t.value_at((first.elapsed_time_days + i as i64) as f64),
        })
      })
      .collect(),
    None => Vec::new(),
  };
  let trend_fit = fit.map(|trend| TrendFit {
    trend,
    days_to_completion: trend.days_to_reach(last.scope_at_snapshot as f64),
  });

  let markers = vec![
    DateMarker {
      label: "Planned Delivery".into(),
      date: config.planned_delivery_date,
    },
    DateMarker {
      label: "Green Buffer Start".into(),
      date: config.buffer_green_date,
    },
    DateMarker {
      label: "Yellow Buffer Start".into(),
      date: config.buffer_yellow_date,
    },
    DateMarker {
      label: "Red Buffer Start".into(),
      date: config.buffer_red_date,
    },
    DateMarker {
      label: "Beyond Red Buffer Start".into(),
      date: config.buffer_beyond_red_date,
    },
  ];

  Some(WorkExecutionChart {
    title: format!("Work Execution Signal Chart as at {}", snapshot_date),
    completed,
    scope,
    trend,
    trend_fit,
    current_scope: last.scope_at_snapshot,
    markers,
    forecast: last.forecasted_delivery_date.map(|date| ForecastMarker {
      date,
      scope: last.scope_at_snapshot,
    }),
  })
}

pub fn fever(log: &ProgressLog, config: &Config, snapshot_date: NaiveDate) -> Option<FeverChart> {
  let last = log.last()?;

  let path: Vec<FeverPoint> = log
    .iter()
    .map(|e| FeverPoint {
      work_done: e.work_done_percentage,
      buffer_consumption: e.buffer_consumption_percentage,
    })
    .collect();
  let max_consumption = path
    .iter()
    .map(|p| p.buffer_consumption)
    .fold(0.0_f64, f64::max);
  let y_max = (max_consumption * 1.2).max(1.1);

  let green_yellow = [config.fever_green_yellow_left_y, config.fever_green_yellow_right_y];
  let yellow_red = [config.fever_yellow_red_left_y, config.fever_yellow_red_right_y];
  let zones = vec![
    FeverZone {
      signal: BufferSignal::Green,
      lower: [0.0, 0.0],
      upper: green_yellow,
    },
    FeverZone {
      signal: BufferSignal::Yellow,
      lower: green_yellow,
      upper: yellow_red,
    },
    FeverZone {
      signal: BufferSignal::Red,
      lower: yellow_red,
      upper: [y_max, y_max],
    },
  ];

  Some(FeverChart {
    title: format!("Fever Chart as at {}", snapshot_date),
    zones,
    path,
    current: FeverPoint {
      work_done: last.work_done_percentage,
      buffer_consumption: last.buffer_consumption_percentage,
    },
    y_max,
  })
}
