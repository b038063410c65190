// operon/examples/drift_retry.rs
//
// Retry expressed as redirection: a catch walks failed uploads over to
// backup steps that are otherwise skipped, then execution continues
// sequentially into publish.

use operon::{CatchFlow, Field, FieldKind, OperonError, Outcome, Pipeline, Schema, StepFlow};
use serde_json::json;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum UploadError {
  #[error("store '{0}' refused the document")]
  StoreRefused(String),

  #[error("engine: {source}")]
  Engine {
    #[from]
    source: OperonError,
  },
}

fn main() -> Result<(), UploadError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let mut pipeline = Pipeline::<UploadError>::new("document_upload");
  pipeline.step("upload_primary")?;
  pipeline.optional_step("upload_backup")?;
  pipeline.step("publish")?;

  let document_only = || Schema::of([Field::required("document", FieldKind::Text)]);
  pipeline.schema("upload_primary", document_only());
  pipeline.schema("upload_backup", document_only());
  pipeline.schema(
    "publish",
    Schema::of([
      Field::required("document", FieldKind::Text),
      Field::required("location", FieldKind::Text),
    ]),
  );

  // The primary store is down today.
  pipeline.on("upload_primary", |_view| {
    Err(UploadError::StoreRefused("primary".to_string()))
  });
  pipeline.on("upload_backup", |view| {
    let mut next = view.raw().clone();
    next.insert("location".to_string(), json!("backup.store/deed"));
    Ok(StepFlow::Commit(next))
  });
  pipeline.on("publish", |view| {
    info!(location = view.text("location").unwrap_or_default(), "publishing");
    let mut next = view.raw().clone();
    next.insert("published".to_string(), json!(true));
    Ok(StepFlow::Commit(next))
  });

  pipeline.catch("retry", |e| matches!(e, UploadError::StoreRefused(_)));
  pipeline.catch_all("reraise");
  pipeline.on_catch("retry", |failure| {
    Ok(match failure.step {
      Some("upload_primary") => CatchFlow::Drift("upload_backup".to_string()),
      _ => CatchFlow::Pass,
    })
  });
  pipeline.on_catch_reraise("reraise");

  let outcome = pipeline.run(
    json!({ "document": "deed-7" })
      .as_object()
      .cloned()
      .expect("object literal"),
  )?;

  if let Outcome::Completed(state) = outcome {
    info!(state = %operon::logfmt::render(&state), "uploaded via backup");
  }
  Ok(())
}
