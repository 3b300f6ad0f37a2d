//! Core engine: replays the event dates and assembles the progress log.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::buffer;
use crate::config::Config;
use crate::error::EngineError;
use crate::events;
use crate::flow_time;
use crate::regression::RegressionHistory;
use crate::snapshot;
use crate::types::*;

/// The forecast engine for one project configuration.
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Baseline flow time from the override or the historic items.
  pub fn baseline(&self, historic: &[HistoricWorkItem]) -> FlowTimeBaseline {
    flow_time::estimate(self.config.historic_flow_time_override, historic)
  }

  /// Compute the baseline, then the progress log as of `snapshot_date`.
  pub fn run(
    &self,
    historic: &[HistoricWorkItem],
    current: &[WorkItem],
    snapshot_date: NaiveDate,
  ) -> Result<Report, EngineError> {
    let baseline = self.baseline(historic);
    let progress_log = self.assemble(current, baseline.days, snapshot_date)?;
    Ok(Report {
      snapshot_date,
      baseline,
      progress_log,
    })
  }

  /// Build the progress log: one entry per event date from the planned start to `snapshot_date`.
  ///
  /// Each entry's forecast is fitted over every (elapsed days, completed)
  /// observation up to and including that entry.
  pub fn assemble(
    &self,
    current: &[WorkItem],
    baseline_flow_time: f64,
    snapshot_date: NaiveDate,
  ) -> Result<ProgressLog, EngineError> {
    self.config.validate()?;
    let start = self.config.planned_start_date;
    let dates = events::extract_event_dates(start, snapshot_date, current)?;
    info!(
      %start,
      snapshot = %snapshot_date,
      event_dates = dates.len(),
      "generating progress log"
    );

    let mut history = RegressionHistory::new();
    let mut entries = Vec::with_capacity(dates.len());

    for date in dates {
      let snap = snapshot::evaluate(date, start, current, baseline_flow_time);
      if snap.completed > snap.scope {
        warn!(
          %date,
          completed = snap.completed,
          scope = snap.scope,
          "completed work exceeds scope"
        );
      }

      history.record(snap.elapsed_days, snap.completed);
      let forecast = match history.fit() {
        Some(trend) => {
          let forecast = trend.forecast(start, snap.scope);
          if forecast.is_none() {
            debug!(%date, slope = trend.slope, "trend not rising; no forecast");
          }
          forecast
        }
        None => {
          debug!(%date, points = history.len(), "insufficient regression points; no forecast");
          None
        }
      };

      let work_done = buffer::work_done(snap.completed, snap.scope);
      let consumption = buffer::buffer_consumption(forecast, &self.config);

      entries.push(ProgressLogEntry {
        snapshot_date: date,
        scope_at_snapshot: snap.scope,
        actual_work_completed: snap.completed,
        elapsed_time_days: snap.elapsed_days,
        actual_operational_throughput: snap.throughput,
        current_50th_percentile_flow_time: snap.flow_time_percentile,
        forecasted_delivery_date: forecast,
        buffer_consumption_percentage: consumption,
        work_done_percentage: work_done,
        current_buffer_signal: buffer::buffer_signal(forecast, &self.config),
        fever_chart_signal: buffer::fever_signal(work_done, consumption, &self.config),
      });
    }

    debug!(entries = entries.len(), "progress log assembled");
    Ok(ProgressLog { entries })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::tests::{d, fixture_config};

  fn item(
    id: &str,
    commit: NaiveDate,
    status: WorkStatus,
    start: Option<NaiveDate>,
    done: Option<NaiveDate>,
    withdrawn: Option<NaiveDate>,
  ) -> WorkItem {
    WorkItem {
      id: id.into(),
      description: String::new(),
      commitment_date: Some(commit),
      status,
      actual_start_date: start,
      actual_completion_date: done,
      date_withdrawn: withdrawn,
    }
  }

  #[test]
  fn single_item_reaches_full_work_done() {
    let start = d(2025, 1, 1);
    let items = vec![item(
      "WI-001",
      start,
      WorkStatus::Completed,
      Some(start),
      Some(d(2025, 1, 5)),
      None,
    )];
    let engine = Engine::new(fixture_config());
    let log = engine.assemble(&items, 4.0, d(2025, 1, 5)).unwrap();

    assert_eq!(log.len(), 2);
    let first = &log.entries[0];
    assert_eq!(first.actual_work_completed, 0);
    assert!(first.forecasted_delivery_date.is_none());
    assert_eq!(first.current_buffer_signal, BufferSignal::Green);

    let last = log.last().unwrap();
    assert_eq!(last.scope_at_snapshot, 1);
    assert_eq!(last.actual_work_completed, 1);
    assert_eq!(last.work_done_percentage, 1.0);
    // (1,0) and (5,1): reaches scope 1 at elapsed day 5.
    assert_eq!(
      last.forecasted_delivery_date,
      d(2025, 1, 6).and_hms_opt(0, 0, 0)
    );
  }

  #[test]
  fn stalled_project_defaults_to_green() {
    let start = d(2025, 1, 1);
    let items = vec![item("WI-001", start, WorkStatus::InProgress, Some(start), None, None)];
    let engine = Engine::new(fixture_config());
    let log = engine.assemble(&items, 4.0, d(2025, 3, 1)).unwrap();

    let last = log.last().unwrap();
    assert_eq!(last.actual_work_completed, 0);
    assert!(last.forecasted_delivery_date.is_none());
    assert_eq!(last.buffer_consumption_percentage, 0.0);
    assert_eq!(last.current_buffer_signal, BufferSignal::Green);
  }

  #[test]
  fn snapshot_before_start_fails() {
    let engine = Engine::new(fixture_config());
    let err = engine.assemble(&[], 4.0, d(2024, 12, 31)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange { .. }));
  }

  #[test]
  fn invalid_config_fails_before_assembly() {
    let config = Config {
      buffer_green_date: d(2025, 2, 1),
      ..fixture_config()
    };
    let err = Engine::new(config).assemble(&[], 4.0, d(2025, 1, 10)).unwrap_err();
    assert!(matches!(err, EngineError::Configuration { .. }));
  }

  #[test]
  fn run_uses_override_baseline() {
    let config = Config {
      historic_flow_time_override: Some(8.0),
      ..fixture_config()
    };
    let report = Engine::new(config).run(&[], &[], d(2025, 1, 3)).unwrap();
    assert_eq!(report.baseline.source, BaselineSource::Override);
    assert_eq!(report.progress_log.entries[0].current_50th_percentile_flow_time, 8.0);
  }

  #[test]
  fn elapsed_days_strictly_increase() {
    let start = d(2025, 1, 1);
    let items = vec![
      item("A", start, WorkStatus::Completed, Some(d(2025, 1, 2)), Some(d(2025, 1, 9)), None),
      item("B", d(2025, 1, 4), WorkStatus::Completed, Some(d(2025, 1, 5)), Some(d(2025, 1, 7)), None),
      item("C", d(2025, 1, 6), WorkStatus::NotStarted, None, None, Some(d(2025, 1, 8))),
    ];
    let log = Engine::new(fixture_config())
      .assemble(&items, 4.0, d(2025, 1, 15))
      .unwrap();
    for pair in log.entries.windows(2) {
      assert!(pair[0].elapsed_time_days < pair[1].elapsed_time_days);
      assert!(pair[0].snapshot_date < pair[1].snapshot_date);
    }
    for entry in log.iter() {
      assert!(entry.scope_at_snapshot >= entry.actual_work_completed);
    }
  }
}
