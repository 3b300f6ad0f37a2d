//! Errors surfaced by the report tool.

use std::path::PathBuf;

use chrono::NaiveDate;
use move_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error("schema: sheet '{sheet}' not found in workbook")]
  MissingSheet { sheet: String },

  #[error("schema: sheet '{sheet}' is missing required column '{column}'")]
  MissingColumn { sheet: String, column: String },

  #[error("schema: sheet '{sheet}' row {row}: {reason}")]
  MalformedRow {
    sheet: String,
    row: usize,
    reason: String,
  },

  #[error("file '{}' not found", .0.display())]
  NotFound(PathBuf),

  #[error("file '{}' already exists; pass --overwrite to replace it", .0.display())]
  AlreadyExists(PathBuf),

  #[error("date arithmetic out of range from {0}")]
  DateOutOfRange(NaiveDate),

  #[error("usage: {0}")]
  Usage(String),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("csv: {0}")]
  Csv(#[from] csv::Error),
}

impl ReportError {
  pub fn missing_sheet(sheet: &str) -> Self {
    Self::MissingSheet {
      sheet: sheet.to_string(),
    }
  }

  pub fn missing_column(sheet: &str, column: &str) -> Self {
    Self::MissingColumn {
      sheet: sheet.to_string(),
      column: column.to_string(),
    }
  }

  /// Missing sheets, missing columns and malformed rows.
  pub fn is_schema(&self) -> bool {
    matches!(
      self,
      Self::MissingSheet { .. } | Self::MissingColumn { .. } | Self::MalformedRow { .. }
    )
  }
}
