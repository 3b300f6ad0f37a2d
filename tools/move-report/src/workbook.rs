//! JSON workbook: named sheets of header-aligned rows.
//!
//! ```json
//! { "sheets": [ { "name": "Current_Work_Items",
//!                 "columns": ["Work_Item_ID", "Status"],
//!                 "rows": [["WI-001", "Completed"]] } ] }
//! ```
//!
//! Cells hold plain values only (strings, numbers, null); formulas must be
//! resolved before the workbook is handed to the engine.

use move_engine::normalize::is_blank;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::ReportError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
  #[serde(default)]
  pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
  pub name: String,
  #[serde(default)]
  pub columns: Vec<String>,
  #[serde(default)]
  pub rows: Vec<Vec<Value>>,
  /// Structured payload for non-tabular sheets (chart data).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

impl Workbook {
  pub fn load(path: &Path) -> Result<Self, ReportError> {
    let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => ReportError::NotFound(path.to_path_buf()),
      _ => ReportError::Io(e),
    })?;
    Ok(serde_json::from_str(&raw)?)
  }

  pub fn save(&self, path: &Path) -> Result<(), ReportError> {
    let mut json = serde_json::to_vec_pretty(self)?;
    json.push(b'\n');
    fs::write(path, json)?;
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&Sheet> {
    self.sheets.iter().find(|s| s.name == name)
  }

  /// The named sheet, or a schema error.
  pub fn sheet(&self, name: &str) -> Result<&Sheet, ReportError> {
    self.get(name).ok_or_else(|| ReportError::missing_sheet(name))
  }

  /// Replace the sheet with the same name in place, or append it.
  pub fn upsert(&mut self, sheet: Sheet) {
    match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
      Some(existing) => *existing = sheet,
      None => self.sheets.push(sheet),
    }
  }

  pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
    self.sheets.iter().map(|s| s.name.as_str())
  }
}

impl Sheet {
  pub fn new(name: &str, columns: &[&str]) -> Self {
    Self {
      name: name.to_string(),
      columns: columns.iter().map(|c| c.to_string()).collect(),
      rows: Vec::new(),
      data: None,
    }
  }

  /// A sheet carrying a structured payload instead of rows.
  pub fn with_data(name: &str, data: Value) -> Self {
    Self {
      name: name.to_string(),
      data: Some(data),
      ..Self::default()
    }
  }

  pub fn push_row(&mut self, row: Vec<Value>) {
    self.rows.push(row);
  }

  pub fn column_index(&self, column: &str) -> Option<usize> {
    self.columns.iter().position(|c| c.trim() == column)
  }

  pub fn require_columns(&self, required: &[&str]) -> Result<(), ReportError> {
    match required.iter().find(|c| self.column_index(c).is_none()) {
      Some(missing) => Err(ReportError::missing_column(&self.name, missing)),
      None => Ok(()),
    }
  }

  /// Non-blank rows as objects keyed by lower-cased column name, each with
  /// its 1-based data row number (blank rows still count).
  ///
  /// Short rows are padded with nulls; cells beyond the header are an error.
  pub fn records(&self) -> Result<Vec<(usize, Map<String, Value>)>, ReportError> {
    let keys: Vec<String> = self.columns.iter().map(|c| c.trim().to_ascii_lowercase()).collect();
    let mut out = Vec::with_capacity(self.rows.len());
    for (i, row) in self.rows.iter().enumerate() {
      let number = i + 1;
      if row.iter().all(is_blank) {
        continue;
      }
      if row.len() > keys.len() && row[keys.len()..].iter().any(|c| !is_blank(c)) {
        return Err(ReportError::MalformedRow {
          sheet: self.name.clone(),
          row: number,
          reason: format!("{} cells for {} columns", row.len(), keys.len()),
        });
      }
      let record = keys
        .iter()
        .enumerate()
        .map(|(j, key)| (key.clone(), row.get(j).cloned().unwrap_or(Value::Null)))
        .collect();
      out.push((number, record));
    }
    Ok(out)
  }
}
