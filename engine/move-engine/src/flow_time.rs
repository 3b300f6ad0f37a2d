//! Baseline flow time: override, or the median of historic flow times.

use tracing::{info, warn};

use crate::types::{BaselineSource, FlowTimeBaseline, HistoricWorkItem};

/// Used when no historic flow time sample is available.
pub const DEFAULT_FLOW_TIME_DAYS: f64 = 5.0;

/// Percentile `q` (0..=100) with linear interpolation between closest ranks.
///
/// Non-finite values are ignored. Returns `None` for an empty sample.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
  let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
  if sorted.is_empty() {
    return None;
  }
  sorted.sort_by(f64::total_cmp);

  let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
  let lo = rank.floor() as usize;
  let hi = rank.ceil() as usize;
  let frac = rank - lo as f64;
  Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
  percentile(values, 50.0)
}

/// Baseline flow time for the project.
///
/// The override wins unconditionally; otherwise the median of the historic
/// items' flow times; otherwise [`DEFAULT_FLOW_TIME_DAYS`].
pub fn estimate(override_days: Option<f64>, historic: &[HistoricWorkItem]) -> FlowTimeBaseline {
  if let Some(days) = override_days {
    info!(days, "using historic flow time override");
    return FlowTimeBaseline {
      days,
      source: BaselineSource::Override,
    };
  }

  let samples: Vec<f64> = historic.iter().filter_map(|h| h.flow_time_days).collect();
  match median(&samples) {
    Some(days) => {
      info!(days, samples = samples.len(), "historic 50th percentile flow time");
      FlowTimeBaseline {
        days,
        source: BaselineSource::Historic,
      }
    }
    None => {
      warn!(
        default = DEFAULT_FLOW_TIME_DAYS,
        "no valid historic flow time samples; using default"
      );
      FlowTimeBaseline {
        days: DEFAULT_FLOW_TIME_DAYS,
        source: BaselineSource::Default,
      }
    }
  }
}
