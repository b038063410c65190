// demos/document_flow/src/main.rs

// Declare modules for the application
mod errors;
mod pipelines;

use operon::{logfmt, Outcome, Registry};
use serde_json::{json, Value};
use tracing::{error, info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

use crate::errors::AppError;

fn main() -> anyhow::Result<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  info!("starting document_flow demo");

  let registry = Registry::<AppError>::new();
  pipelines::register_all(&registry)?;

  let scenarios: [(&str, Value); 3] = [
    ("all stores healthy", json!([])),
    ("primary outage", json!(["primary_store"])),
    ("total outage", json!(["primary_store", "mirror_a", "mirror_b"])),
  ];

  for (label, outages) in scenarios {
    info!(scenario = label, "running document_upload");
    let raw = json!({ "document": "deed-7", "outages": outages })
      .as_object()
      .cloned()
      .expect("object literal");

    match registry.run("document_upload", raw) {
      Ok(Outcome::Completed(state)) => {
        info!(scenario = label, state = %logfmt::render(&state), "completed");
      }
      Ok(Outcome::Absorbed(err)) => {
        // Only reachable if the terminal reraise catch is removed.
        warn!(scenario = label, %err, "failure absorbed into the result");
      }
      Err(err) => {
        error!(scenario = label, %err, "pipeline failed");
      }
    }
  }

  Ok(())
}
