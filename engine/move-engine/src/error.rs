//! Structured error types for the forecast engine.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// A configuration field is missing, blank, malformed, or out of order.
  #[error("configuration: {field}: {reason}")]
  Configuration { field: String, reason: String },

  /// A work-item cell could not be coerced into its typed value.
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("invalid range: snapshot date {snapshot} is before planned start date {start}")]
  InvalidRange { snapshot: NaiveDate, start: NaiveDate },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn configuration(field: &str, reason: &str) -> Self {
    Self::Configuration {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  /// Field name carried by configuration/validation errors, if any.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Configuration { field, .. } | Self::Validation { field, .. } => Some(field),
      _ => None,
    }
  }
}
