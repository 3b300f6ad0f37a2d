//! Incremental least-squares burnup trend: completed = slope * elapsed_days + intercept.
//!
//! Observations are keyed by elapsed day; re-observing a day replaces the
//! earlier value. Sums are kept as exact integers so every fit is identical to
//! a from-scratch fit over the retained points.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;
use std::collections::BTreeMap;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Running sufficient statistics over unique (x, y) points.
#[derive(Debug, Clone, Default)]
pub struct RegressionHistory {
  points: BTreeMap<i64, u32>,
  sum_x: i128,
  sum_y: i128,
  sum_xy: i128,
  sum_xx: i128,
  sum_yy: i128,
}

/// A fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
  pub slope: f64,
  pub intercept: f64,
  /// Coefficient of determination; 1.0 when the points are collinear.
  pub r_squared: f64,
  pub points: usize,
}

impl RegressionHistory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record `y` at `x`. A repeated `x` overwrites the earlier observation.
  pub fn record(&mut self, x: i64, y: u32) {
    let (xi, yi) = (x as i128, y as i128);
    match self.points.insert(x, y) {
      Some(old) => {
        let old = old as i128;
        self.sum_y -= old;
        self.sum_xy -= xi * old;
        self.sum_yy -= old * old;
      }
      None => {
        self.sum_x += xi;
        self.sum_xx += xi * xi;
      }
    }
    self.sum_y += yi;
    self.sum_xy += xi * yi;
    self.sum_yy += yi * yi;
  }

  /// Number of distinct x values retained.
  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn points(&self) -> impl Iterator<Item = (i64, u32)> + '_ {
    self.points.iter().map(|(x, y)| (*x, *y))
  }

  /// Ordinary least squares over the retained points; `None` below two points.
  pub fn fit(&self) -> Option<Trend> {
    let n = self.points.len() as i128;
    if n < 2 {
      return None;
    }

    // Distinct x values guarantee a positive denominator.
    let sxx = n * self.sum_xx - self.sum_x * self.sum_x;
    let sxy = n * self.sum_xy - self.sum_x * self.sum_y;
    let syy = n * self.sum_yy - self.sum_y * self.sum_y;
    if sxx <= 0 {
      return None;
    }

    let slope = sxy as f64 / sxx as f64;
    let intercept = (self.sum_y * self.sum_xx - self.sum_x * self.sum_xy) as f64 / sxx as f64;
    let r_squared = if syy == 0 {
      1.0
    } else {
      let cov = sxy as f64;
      (cov * cov) / (sxx as f64 * syy as f64)
    };

    Some(Trend {
      slope,
      intercept,
      r_squared,
      points: self.points.len(),
    })
  }
}

impl Trend {
  pub fn value_at(&self, x: f64) -> f64 {
    self.slope * x + self.intercept
  }

  /// x at which the trend reaches `target`; `None` for a flat or declining trend.
  pub fn days_to_reach(&self, target: f64) -> Option<f64> {
    if self.slope <= 0.0 || !self.slope.is_finite() {
      return None;
    }
    let days = (target - self.intercept) / self.slope;
    days.is_finite().then_some(days)
  }

  /// Date at which the trend crosses `scope`, counted in fractional days from `start`.
  pub fn forecast(&self, start: NaiveDate, scope: u32) -> Option<NaiveDateTime> {
    self
      .days_to_reach(scope as f64)
      .and_then(|days| offset_days(start, days))
  }
}

/// `start` (at midnight) plus a fractional number of days, at microsecond precision.
pub fn offset_days(start: NaiveDate, days: f64) -> Option<NaiveDateTime> {
  let micros = (days * MICROS_PER_DAY).round();
  if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
    return None;
  }
  start
    .and_hms_opt(0, 0, 0)?
    .checked_add_signed(TimeDelta::microseconds(micros as i64))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  /// Textbook two-pass least squares, for cross-checking the running sums.
  fn naive_fit(points: &[(i64, u32)]) -> (f64, f64) {
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0 as f64).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1 as f64).sum::<f64>() / n;
    let sxy: f64 = points.iter().map(|p| (p.0 as f64 - mx) * (p.1 as f64 - my)).sum();
    let sxx: f64 = points.iter().map(|p| (p.0 as f64 - mx).powi(2)).sum();
    let slope = sxy / sxx;
    (slope, my - slope * mx)
  }

  #[test]
  fn fewer_than_two_points_has_no_fit() {
    let mut h = RegressionHistory::new();
    assert!(h.fit().is_none());
    h.record(1, 0);
    assert!(h.fit().is_none());
    // Same x again: still one point.
    h.record(1, 3);
    assert!(h.fit().is_none());
  }

  #[test]
  fn two_point_projection() {
    let mut h = RegressionHistory::new();
    h.record(1, 0);
    h.record(5, 1);
    let trend = h.fit().unwrap();
    assert!((trend.slope - 0.25).abs() < 1e-12);
    assert!((trend.intercept + 0.25).abs() < 1e-12);
    assert!((trend.r_squared - 1.0).abs() < 1e-12);
    assert_eq!(trend.days_to_reach(4.0), Some(17.0));

    let start = d(2025, 1, 1);
    let forecast = trend.forecast(start, 4).unwrap();
    assert_eq!(forecast, d(2025, 1, 18).and_hms_opt(0, 0, 0).unwrap());
  }

  #[test]
  fn later_observation_of_same_day_wins() {
    let mut h = RegressionHistory::new();
    h.record(1, 0);
    h.record(5, 4);
    h.record(5, 1);
    let points: Vec<_> = h.points().collect();
    assert_eq!(points, vec![(1, 0), (5, 1)]);
    let trend = h.fit().unwrap();
    assert!((trend.slope - 0.25).abs() < 1e-12);
  }

  #[test]
  fn flat_trend_cannot_forecast() {
    let mut h = RegressionHistory::new();
    h.record(1, 2);
    h.record(6, 2);
    let trend = h.fit().unwrap();
    assert_eq!(trend.slope, 0.0);
    assert_eq!(trend.r_squared, 1.0);
    assert!(trend.forecast(d(2025, 1, 1), 5).is_none());
  }

  #[test]
  fn declining_trend_cannot_forecast() {
    let mut h = RegressionHistory::new();
    h.record(1, 3);
    h.record(4, 1);
    assert!(h.fit().unwrap().forecast(d(2025, 1, 1), 5).is_none());
  }

  #[test]
  fn running_sums_match_full_refit() {
    let series: [(i64, u32); 11] = [
      (1, 0),
      (5, 1),
      (6, 1),
      (10, 2),
      (11, 2),
      (12, 2),
      (13, 2),
      (14, 2),
      (17, 2),
      (18, 3),
      (21, 4),
    ];
    let mut h = RegressionHistory::new();
    for (i, &(x, y)) in series.iter().enumerate() {
      h.record(x, y);
      if i == 0 {
        continue;
      }
      let trend = h.fit().unwrap();
      let (slope, intercept) = naive_fit(&series[..=i]);
      assert!((trend.slope - slope).abs() <= 1e-9 * slope.abs().max(1.0));
      assert!((trend.intercept - intercept).abs() <= 1e-9 * intercept.abs().max(1.0));
    }
  }

  #[test]
  fn fit_keeps_succeeding_once_two_points_exist() {
    let mut h = RegressionHistory::new();
    let mut had_fit = false;
    for (x, y) in [(1, 0), (2, 0), (3, 1), (3, 0), (9, 0), (12, 5)] {
      h.record(x, y);
      let fit = h.fit();
      if had_fit {
        assert!(fit.is_some());
      }
      had_fit |= fit.is_some();
    }
    assert!(had_fit);
  }

  #[test]
  fn fractional_forecast_keeps_time_of_day() {
    let mut h = RegressionHistory::new();
    h.record(1, 0);
    h.record(5, 1);
    h.record(6, 1);
    // slope 3/14, intercept -4/21 -> 19.5556 days past start.
    let forecast = h.fit().unwrap().forecast(d(2025, 1, 1), 4).unwrap();
    assert_eq!(forecast.date(), d(2025, 1, 20));
    assert_eq!(forecast.format("%H:%M").to_string(), "13:20");
  }

  #[test]
  fn unrepresentable_offset_is_none() {
    assert!(offset_days(d(2025, 1, 1), f64::INFINITY).is_none());
    assert!(offset_days(d(2025, 1, 1), 1e300).is_none());
  }
}
