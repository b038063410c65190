// demos/document_flow/src/pipelines.rs
//
// Three single-step store pipelines plus the document_upload pipeline
// that composes them: the upload steps delegate to a store pipeline's
// run and fold its final state into a Commit. A failed upload drifts
// to the next mirror; when the mirrors run out, the terminal catch
// re-raises the failure.

use std::sync::Arc;

use operon::{
  CatchFlow, Field, FieldKind, Outcome, Pipeline, Registry, Schema, StateView, StepFlow,
};
use serde_json::json;
use tracing::{debug, info};

use crate::errors::{AppError, Result};

const STORES: [(&str, &str); 3] = [
  ("primary_store", "primary.store"),
  ("mirror_a", "mirror-a.store"),
  ("mirror_b", "mirror-b.store"),
];

fn push_schema() -> Schema {
  Schema::of([
    Field::required("document", FieldKind::Text),
    Field::optional("outages", FieldKind::List),
  ])
}

/// A store is one pipeline with a single `push` step. An entry in the
/// state's `outages` list simulates the store being down.
fn store_pipeline(name: &'static str, endpoint: &'static str) -> Result<Pipeline<AppError>> {
  let mut pipeline = Pipeline::<AppError>::new(name);
  pipeline.step("push")?;
  pipeline.schema("push", push_schema());
  pipeline.on("push", move |view| {
    let down = view
      .list("outages")
      .map(|outages| outages.iter().any(|entry| entry.as_str() == Some(name)))
      .unwrap_or(false);
    if down {
      return Err(AppError::Upload {
        store: name.to_string(),
        reason: "service outage".to_string(),
      });
    }
    let document = view.text("document").unwrap_or_default();
    let location = format!("{endpoint}/{document}");
    info!(store = name, location = %location, "document stored");
    let mut next = view.raw().clone();
    next.insert("location".to_string(), json!(location));
    Ok(StepFlow::Commit(next))
  });
  Ok(pipeline)
}

/// Delegates a step to another pipeline's run; an absorbed failure in
/// the child is re-raised here so the parent's catches decide.
fn delegate(
  store: Arc<Pipeline<AppError>>,
) -> impl Fn(StateView<'_>) -> Result<StepFlow, AppError> + Send + Sync + 'static {
  move |view| match store.run(view.raw().clone())? {
    Outcome::Completed(folded) => Ok(StepFlow::Commit(folded)),
    Outcome::Absorbed(error) => Err(error),
  }
}

pub fn register_all(registry: &Registry<AppError>) -> Result<()> {
  let mut stores = Vec::new();
  for (name, endpoint) in STORES {
    stores.push(registry.register(store_pipeline(name, endpoint)?));
  }

  let mut document = Pipeline::<AppError>::new("document_upload");
  document.step("validate")?;
  document.step_for("upload_primary", true, "primary_store")?;
  document.step_for("upload_mirror_a", false, "mirror_a")?;
  document.step_for("upload_mirror_b", false, "mirror_b")?;
  document.step("publish")?;

  document.schema(
    "validate",
    Schema::of([Field::required("document", FieldKind::Text)]),
  );
  for step in ["upload_primary", "upload_mirror_a", "upload_mirror_b"] {
    document.schema(step, push_schema());
  }
  document.schema(
    "publish",
    Schema::of([
      Field::required("document", FieldKind::Text),
      Field::required("location", FieldKind::Text),
    ]),
  );

  document.on("validate", |view| {
    match view.text("document") {
      Some(name) if !name.is_empty() => Ok(StepFlow::Stay),
      _ => Err(AppError::Validation("document name is empty".to_string())),
    }
  });
  for (index, step) in ["upload_primary", "upload_mirror_a", "upload_mirror_b"]
    .into_iter()
    .enumerate()
  {
    document.on(step, delegate(Arc::clone(&stores[index])));
  }
  document.on("publish", |view| {
    let mut next = view.raw().clone();
    next.insert("published".to_string(), json!(true));
    Ok(StepFlow::Commit(next))
  });

  document.catch("retry", |e| matches!(e, AppError::Upload { .. }));
  document.catch_all("reraise");
  document.on_catch("retry", |failure| {
    Ok(match failure.step {
      Some("upload_primary") => CatchFlow::Drift("upload_mirror_a".to_string()),
      Some("upload_mirror_a") => CatchFlow::Drift("upload_mirror_b".to_string()),
      _ => CatchFlow::Pass,
    })
  });
  document.on_catch_reraise("reraise");

  document.before_each_step(|step, state| {
    debug!(step, state = %operon::logfmt::render(state), "attempting step");
  });

  registry.register(document);
  Ok(())
}
