// operon/examples/error_handling.rs
//
// Shows the three fates of a raised error: absorbed into the result,
// re-raised by a terminal catch, and propagated with no matching catch.

use operon::{CatchFlow, OperonError, Outcome, Pipeline, Schema};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
enum AppError {
  #[error("ledger rejected the entry: {0}")]
  LedgerRejected(String),

  #[error("audit trail unavailable")]
  AuditUnavailable,

  #[error("engine: {source}")]
  Engine {
    #[from]
    source: OperonError,
  },
}

fn ledger_pipeline(terminal_reraise: bool) -> Pipeline<AppError> {
  let mut pipeline = Pipeline::<AppError>::new("ledger");
  pipeline.step("post_entry").expect("fresh name");
  pipeline.schema("post_entry", Schema::default());
  pipeline.on("post_entry", |_view| {
    Err(AppError::LedgerRejected("duplicate sequence number".to_string()))
  });

  // First catch only observes; it neither redirects nor re-raises.
  pipeline.catch("note", |e| matches!(e, AppError::LedgerRejected(_)));
  pipeline.on_catch("note", |failure| {
    warn!(error = %failure.error, step = ?failure.step, "ledger rejection observed");
    Ok(CatchFlow::Pass)
  });

  if terminal_reraise {
    pipeline.catch_all("reraise");
    pipeline.on_catch_reraise("reraise");
  }

  pipeline
}

fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  // Without a terminal reraise catch the matched error is absorbed:
  // the run "succeeds" and hands the error back as a value.
  let absorbed = ledger_pipeline(false).run(json!({}).as_object().cloned().unwrap());
  match absorbed {
    Ok(Outcome::Absorbed(error)) => info!(%error, "absorbed, not raised"),
    other => warn!("unexpected outcome: {other:?}"),
  }

  // With the terminal catch, the same failure surfaces to the caller.
  let reraised = ledger_pipeline(true).run(json!({}).as_object().cloned().unwrap());
  match reraised {
    Err(error) => info!(%error, "re-raised out of the run"),
    other => warn!("unexpected outcome: {other:?}"),
  }

  // An error no filter matches propagates without running any catch.
  let mut unmatched = Pipeline::<AppError>::new("audit");
  unmatched.step("record").expect("fresh name");
  unmatched.schema("record", Schema::default());
  unmatched.on("record", |_view| Err(AppError::AuditUnavailable));
  unmatched.catch("ledger_only", |e| matches!(e, AppError::LedgerRejected(_)));
  unmatched.on_catch("ledger_only", |_failure| Ok(CatchFlow::Pass));

  if let Err(error) = unmatched.run(json!({}).as_object().cloned().unwrap()) {
    info!(%error, "propagated untouched");
  }
}
