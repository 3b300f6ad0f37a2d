//! Binary entrypoint: read one JSON request from stdin, write one report to stdout.
//!
//! On failure an ErrorOutput object is written instead and the exit code is 1.

use move_engine::types::ErrorOutput;
use move_engine::{EngineError, InboundRequest};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .with_writer(io::stderr)
    .init();

  let mut out = io::stdout().lock();
  match run_binary() {
    Ok(json) => {
      let _ = out.write_all(&json);
      let _ = writeln!(out);
    }
    Err(e) => {
      let err = match &e {
        EngineError::Configuration { field, reason } | EngineError::Validation { field, reason } => {
          ErrorOutput::new(reason.clone()).with_field(field.clone())
        }
        _ => ErrorOutput::new(e.to_string()),
      };
      let _ = serde_json::to_writer(&mut out, &err);
      let _ = writeln!(out);
      let _ = out.flush();
      std::process::exit(1);
    }
  }
}

fn run_binary() -> Result<Vec<u8>, EngineError> {
  let mut raw = String::new();
  io::stdin()
    .lock()
    .read_to_string(&mut raw)
    .map_err(|e| EngineError::validation("stdin", &e.to_string()))?;
  let request: InboundRequest = serde_json::from_str(&raw)?;

  let report = move_engine::run(&request)?;
  Ok(serde_json::to_vec(&report)?)
}
