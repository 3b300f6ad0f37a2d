//! Event dates: the days on which scope or completion counts can change.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::types::WorkItem;

/// Distinct dates in `[start, snapshot]`, ascending.
///
/// Always contains `start` and `snapshot`, plus every commitment, start,
/// completion and withdrawal date of `items` inside the window.
pub fn extract_event_dates(
  start: NaiveDate,
  snapshot: NaiveDate,
  items: &[WorkItem],
) -> Result<Vec<NaiveDate>, EngineError> {
  if snapshot < start {
    return Err(EngineError::InvalidRange { snapshot, start });
  }

  let mut dates = BTreeSet::from([start, snapshot]);
  dates.extend(
    items
      .iter()
      .flat_map(WorkItem::event_dates)
      .filter(|d| (start..=snapshot).contains(d)),
  );
  Ok(dates.into_iter().collect())
}
