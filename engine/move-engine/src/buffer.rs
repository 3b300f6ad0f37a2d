//! Buffer consumption, buffer signal, and fever chart zone classification.

use chrono::NaiveDateTime;

use crate::config::Config;
use crate::types::BufferSignal;

/// Fraction of the buffer (green date .. beyond-red date) used by the forecast.
///
/// Counted in whole calendar days past the green date, never negative. Zero
/// without a forecast or when the buffer has no width.
pub fn buffer_consumption(forecast: Option<NaiveDateTime>, config: &Config) -> f64 {
  let Some(forecast) = forecast else {
    return 0.0;
  };
  let span = config.buffer_span_days();
  if span <= 0 {
    return 0.0;
  }
  let slip = (forecast.date() - config.buffer_green_date).num_days();
  (slip as f64 / span as f64).max(0.0)
}

/// Signal from the forecast's calendar date against the buffer dates (inclusive).
///
/// Without a forecast the signal is `Green`.
pub fn buffer_signal(forecast: Option<NaiveDateTime>, config: &Config) -> BufferSignal {
  let Some(forecast) = forecast else {
    return BufferSignal::Green;
  };
  let day = forecast.date();
  if day <= config.buffer_green_date {
    BufferSignal::Green
  } else if day <= config.buffer_yellow_date {
    BufferSignal::Yellow
  } else if day <= config.buffer_red_date {
    BufferSignal::Red
  } else {
    BufferSignal::BeyondRed
  }
}

pub fn work_done(completed: u32, scope: u32) -> f64 {
  if scope > 0 {
    completed as f64 / scope as f64
  } else {
    0.0
  }
}

/// Zone of the point (work done, buffer consumption) on the fever chart.
///
/// Zone boundaries are straight lines across work done 0..1; consumption of
/// 1.0 or more is beyond red regardless of progress.
pub fn fever_signal(work_done: f64, consumption: f64, config: &Config) -> BufferSignal {
  let x = work_done.clamp(0.0, 1.0);
  let green_yellow = lerp(config.fever_green_yellow_left_y, config.fever_green_yellow_right_y, x);
  let yellow_red = lerp(config.fever_yellow_red_left_y, config.fever_yellow_red_right_y, x);

  if consumption < green_yellow {
    BufferSignal::Green
  } else if consumption < yellow_red {
    BufferSignal::Yellow
  } else if consumption < 1.0 {
    BufferSignal::Red
  } else {
    BufferSignal::BeyondRed
  }
}

fn lerp(left: f64, right: f64, x: f64) -> f64 {
  left + (right - left) * x
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::tests::{d, fixture_config};

  fn at(y: i32, m: u32, day: u32, h: u32) -> Option<NaiveDateTime> {
    d(y, m, day).and_hms_opt(h, 0, 0)
  }

  #[test]
  fn no_forecast_is_green_with_zero_consumption() {
    let config = fixture_config();
    assert_eq!(buffer_consumption(None, &config), 0.0);
    assert_eq!(buffer_signal(None, &config), BufferSignal::Green);
  }

  #[test]
  fn consumption_counts_whole_days_past_green() {
    let config = fixture_config();
    // Green 2025-01-17, beyond red 2025-01-26: 9 day buffer.
    let pct = buffer_consumption(at(2025, 1, 20, 13), &config);
    assert!((pct - 3.0 / 9.0).abs() < 1e-12);
    let past = buffer_consumption(at(2025, 2, 5, 22), &config);
    assert!((past - 19.0 / 9.0).abs() < 1e-12);
  }

  #[test]
  fn early_forecast_clamps_to_zero() {
    let config = fixture_config();
    assert_eq!(buffer_consumption(at(2025, 1, 10, 0), &config), 0.0);
  }

  #[test]
  fn zero_width_buffer_consumes_nothing() {
    let config = Config {
      buffer_beyond_red_date: d(2025, 1, 17),
      buffer_red_date: d(2025, 1, 17),
      buffer_yellow_date: d(2025, 1, 17),
      ..fixture_config()
    };
    assert_eq!(buffer_consumption(at(2025, 3, 1, 0), &config), 0.0);
    assert_eq!(buffer_signal(at(2025, 3, 1, 0), &config), BufferSignal::BeyondRed);
  }

  #[test]
  fn signal_thresholds_are_inclusive() {
    let config = fixture_config();
    assert_eq!(buffer_signal(at(2025, 1, 17, 23), &config), BufferSignal::Green);
    assert_eq!(buffer_signal(at(2025, 1, 18, 0), &config), BufferSignal::Yellow);
    assert_eq!(buffer_signal(at(2025, 1, 20, 13), &config), BufferSignal::Yellow);
    assert_eq!(buffer_signal(at(2025, 1, 23, 0), &config), BufferSignal::Red);
    assert_eq!(buffer_signal(at(2025, 1, 24, 0), &config), BufferSignal::BeyondRed);
  }

  #[test]
  fn work_done_guards_empty_scope() {
    assert_eq!(work_done(0, 0), 0.0);
    assert_eq!(work_done(3, 4), 0.75);
    assert_eq!(work_done(1, 1), 1.0);
  }

  #[test]
  fn fever_zones_follow_sloped_boundaries() {
    let config = fixture_config();
    assert_eq!(fever_signal(0.0, 0.0, &config), BufferSignal::Green);
    // Boundary at x=0.25 is 0.275 (green/yellow) and 0.575 (yellow/red).
    assert_eq!(fever_signal(0.25, 1.0 / 9.0, &config), BufferSignal::Green);
    assert_eq!(fever_signal(0.25, 3.0 / 9.0, &config), BufferSignal::Yellow);
    assert_eq!(fever_signal(0.5, 3.0 / 9.0, &config), BufferSignal::Green);
    assert_eq!(fever_signal(1.0, 8.0 / 9.0, &config), BufferSignal::Red);
    assert_eq!(fever_signal(0.75, 10.0 / 9.0, &config), BufferSignal::BeyondRed);
  }
}
