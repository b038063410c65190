// operon/examples/registry_basic.rs
//
// Registers two pipelines and composes one from the other: the filing
// pipeline's first step delegates to the notary pipeline's run and
// folds the resulting state into its own Commit.

use operon::{OperonError, Pipeline, Registry, Schema, StepFlow};
use serde_json::json;
use tracing::info;

fn main() -> Result<(), OperonError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let registry = Registry::<OperonError>::new();

  let mut notary = Pipeline::<OperonError>::new("notary");
  notary.step("stamp")?;
  notary.schema("stamp", Schema::default());
  notary.on("stamp", |view| {
    let mut next = view.raw().clone();
    next.insert("notarized".to_string(), json!(true));
    Ok(StepFlow::Commit(next))
  });
  let notary = registry.register(notary);

  let mut filing = Pipeline::<OperonError>::new("filing");
  filing.step_for("notarize", true, "notary")?;
  filing.step("archive")?;
  filing.schema("notarize", Schema::default());
  filing.schema("archive", Schema::default());
  filing.on("notarize", move |view| {
    let folded = notary.run(view.raw().clone())?.completed().ok_or_else(|| {
      OperonError::Handler {
        source: anyhow::anyhow!("notary absorbed a failure"),
      }
    })?;
    Ok(StepFlow::Commit(folded))
  });
  filing.on("archive", |view| {
    let mut next = view.raw().clone();
    next.insert("archived".to_string(), json!(true));
    Ok(StepFlow::Commit(next))
  });
  registry.register(filing);

  let outcome = registry.run(
    "filing",
    json!({ "document": "deed-7" }).as_object().cloned().expect("object literal"),
  )?;

  if let Some(state) = outcome.completed() {
    info!(state = %operon::logfmt::render(&state), "filed");
  }
  Ok(())
}
