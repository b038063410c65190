// operon/examples/basic_pipeline.rs

use operon::{fresh, Field, FieldKind, OperonError, Outcome, Pipeline, Schema, StepFlow};
use serde_json::json;
use tracing::info;

fn main() -> Result<(), OperonError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 1. Create a new pipeline definition.
  //    Pipeline<Err> where Err must be From<OperonError>; for a simple
  //    example, OperonError itself will do.
  let mut pipeline = Pipeline::<OperonError>::new("greeting");
  pipeline.step("compose")?;
  pipeline.step("sign")?;
  pipeline.step("deliver")?;

  // 2. Register the input shape each step expects.
  pipeline.schema("compose", Schema::of([Field::required("name", FieldKind::Text)]));
  pipeline.schema("sign", Schema::of([Field::required("message", FieldKind::Text)]));
  pipeline.schema(
    "deliver",
    Schema::of([
      Field::required("message", FieldKind::Text),
      Field::required("signed", FieldKind::Boolean),
    ]),
  );

  // 3. Bind handlers. Only a Commit (built with `fresh`) carries state
  //    forward; a handler that returns Stay changes nothing.
  pipeline.on("compose", |view| {
    let name = view.text("name").unwrap_or("stranger");
    fresh(json!({ "name": name, "message": format!("Hello, {name}!") }))
  });
  pipeline.on("sign", |view| {
    let message = view.text("message").unwrap_or_default();
    fresh(json!({ "message": format!("{message} (signed: operon)"), "signed": true }))
  });
  pipeline.on("deliver", |view| {
    info!(message = view.text("message").unwrap_or_default(), "delivering");
    Ok(StepFlow::Stay)
  });

  // 4. Run it over an initial raw state.
  let outcome = pipeline.run(
    json!({ "name": "Ada" })
      .as_object()
      .cloned()
      .expect("object literal"),
  )?;

  match outcome {
    Outcome::Completed(state) => info!(state = %operon::logfmt::render(&state), "pipeline completed"),
    Outcome::Absorbed(error) => info!(%error, "pipeline absorbed a failure"),
  }

  Ok(())
}
