//! MOVE Forecast Engine: deterministic delivery forecasting for one project.
//!
//! Reconstructs an event-driven progress log from work-item dates, re-fits a
//! least-squares burnup trend at every event date, projects it to the scope
//! line, and classifies each snapshot against the buffer schedule and the
//! fever chart zones.
//!
//! No DB, no network; pure computation over an in-memory snapshot.

pub mod buffer;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod flow_time;
pub mod normalize;
pub mod regression;
pub mod snapshot;
pub mod types;

pub use config::Config;
pub use engine::Engine;
pub use error::EngineError;
pub use types::{
  BufferSignal, HistoricWorkItem, InboundRequest, ProgressLog, ProgressLogEntry, Report, WorkItem,
};

/// Normalize a full request and run the engine on it (no I/O).
pub fn run(request: &InboundRequest) -> Result<Report, EngineError> {
  let config = normalize::normalize_config(&request.config)?;
  let historic = normalize::normalize_historic_items(&request.historic_items)?;
  let current = normalize::normalize_work_items(&request.current_items)?;
  let snapshot_date = normalize::parse_snapshot_date(&request.snapshot_date)?;
  Engine::new(config).run(&historic, &current, snapshot_date)
}
