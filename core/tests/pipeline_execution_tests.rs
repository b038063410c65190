// tests/pipeline_execution_tests.rs
mod common; // Reference the common module

use common::*;
use operon::{Field, FieldKind, OperonError, Pipeline, Schema, SchemaError, StepFlow};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn steps_run_in_order_and_only_commit_changes_state() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestError>::new("exec");
  pipeline.step("first").unwrap();
  pipeline.step("second").unwrap();
  pipeline.step("third").unwrap();
  pipeline.schema("first", open_schema());
  pipeline.schema("second", open_schema());
  pipeline.schema("third", open_schema());

  pipeline.on("first", |view| {
    let mut next = view.raw().clone();
    next.insert("trail".to_string(), json!(["first"]));
    Ok(StepFlow::Commit(next))
  });
  pipeline.on("second", |view| {
    let mut next = view.raw().clone();
    let trail = next.get_mut("trail").and_then(|v| v.as_array_mut()).unwrap();
    trail.push(json!("second"));
    Ok(StepFlow::Commit(next))
  });
  // Derives data but never commits it: the mutation must not leak.
  pipeline.on("third", |view| {
    let mut scratch = view.raw().clone();
    scratch.insert("leak".to_string(), json!(true));
    Ok(StepFlow::Stay)
  });

  let outcome = pipeline.run(state_of(json!({"seed": 1}))).unwrap();
  let final_state = outcome.completed().unwrap();
  assert_eq!(final_state.get("trail"), Some(&json!(["first", "second"])));
  assert_eq!(final_state.get("seed"), Some(&json!(1)));
  assert!(final_state.get("leak").is_none());
}

#[test]
fn optional_step_is_passed_over_on_a_plain_run() {
  setup_tracing();
  let extra_ran = Arc::new(AtomicBool::new(false));

  let mut pipeline = Pipeline::<TestError>::new("exec");
  pipeline.step("open").unwrap();
  pipeline.optional_step("extra").unwrap();
  pipeline.step("close").unwrap();
  pipeline.schema("open", open_schema());
  pipeline.schema("extra", open_schema());
  pipeline.schema("close", open_schema());

  pipeline.on("open", commit_entry("opened", json!(true)));
  pipeline.on("extra", {
    let extra_ran = Arc::clone(&extra_ran);
    move |_view| {
      extra_ran.store(true, Ordering::SeqCst);
      Ok(StepFlow::Stay)
    }
  });
  pipeline.on("close", commit_entry("closed", json!(true)));

  let outcome = pipeline.run(state_of(json!({}))).unwrap();
  let final_state = outcome.completed().unwrap();

  assert!(!extra_ran.load(Ordering::SeqCst));
  assert_eq!(final_state.get("opened"), Some(&json!(true)));
  assert_eq!(final_state.get("closed"), Some(&json!(true)));
}

#[test]
fn declared_step_without_handler_fails_with_missing_task() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestError>::new("exec");
  pipeline.step("ghost").unwrap();
  pipeline.schema("ghost", open_schema());

  let err = pipeline.run(state_of(json!({}))).unwrap_err();
  match err {
    TestError::Engine(s) => {
      assert!(s.contains("MissingTask"), "got: {s}");
      assert!(s.contains("ghost"));
    }
    other => panic!("expected TestError::Engine(MissingTask), got {other:?}"),
  }
}

#[test]
fn declared_step_without_schema_fails_with_missing_schema() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestError>::new("exec");
  pipeline.step("bare").unwrap();
  pipeline.on("bare", stay());

  let err = pipeline.run(state_of(json!({}))).unwrap_err();
  match err {
    TestError::Engine(s) => {
      assert!(s.contains("MissingSchema"), "got: {s}");
      assert!(s.contains("bare"));
    }
    other => panic!("expected TestError::Engine(MissingSchema), got {other:?}"),
  }
}

// Runs a pipeline whose error type IS OperonError, so the mismatch can
// be inspected structurally instead of through a string wrap.
#[test]
fn schema_mismatch_wraps_the_validator_cause() {
  setup_tracing();
  let mut pipeline = Pipeline::<OperonError>::new("strict");
  pipeline.step("check").unwrap();
  pipeline.schema(
    "check",
    Schema::of([Field::required("count", FieldKind::Integer)]),
  );
  pipeline.on("check", |_view| Ok(StepFlow::Stay));

  let err = pipeline.run(state_of(json!({"count": "nine"}))).unwrap_err();
  match err {
    OperonError::StepSchemaMismatch {
      step,
      receiver,
      raw,
      source,
    } => {
      assert_eq!(step, "check");
      assert_eq!(receiver, "strict");
      assert!(raw.contains("count=\"nine\""), "raw was: {raw}");
      assert!(matches!(
        source,
        SchemaError::InvalidPropertyType { ref field, .. } if field == "count"
      ));
    }
    other => panic!("expected StepSchemaMismatch, got {other:?}"),
  }
}

#[test]
fn duplicate_step_names_are_rejected_at_registration() {
  let mut pipeline = Pipeline::<TestError>::new("dup");
  pipeline.step("once").unwrap();
  let err = pipeline.step("once").unwrap_err();
  assert!(matches!(
    err,
    OperonError::DuplicateStepName { ref name } if name == "once"
  ));
  // A different name still registers fine afterwards.
  pipeline.step("twice").unwrap();
  assert_eq!(pipeline.steps().len(), 2);
}

#[test]
fn before_step_observers_see_pre_step_state_in_order() {
  setup_tracing();
  let seen: Arc<Mutex<Vec<(String, bool)>>> = Arc::new(Mutex::new(Vec::new()));

  let mut pipeline = Pipeline::<TestError>::new("observed");
  pipeline.step("mint").unwrap();
  pipeline.step("ship").unwrap();
  pipeline.schema("mint", open_schema());
  pipeline.schema("ship", open_schema());
  pipeline.on("mint", commit_entry("minted", json!(true)));
  pipeline.on("ship", stay());

  pipeline.before_each_step({
    let seen = Arc::clone(&seen);
    move |step, state| {
      seen
        .lock()
        .unwrap()
        .push((step.to_string(), state.contains_key("minted")));
    }
  });

  pipeline.run(state_of(json!({}))).unwrap();

  let seen = seen.lock().unwrap();
  assert_eq!(
    *seen,
    vec![("mint".to_string(), false), ("ship".to_string(), true)]
  );
}

#[test]
fn after_step_observer_skips_raising_steps() {
  setup_tracing();
  let completed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

  let mut pipeline = Pipeline::<TestError>::new("observed");
  pipeline.step("fine").unwrap();
  pipeline.step("broken").unwrap();
  pipeline.schema("fine", open_schema());
  pipeline.schema("broken", open_schema());
  pipeline.on("fine", stay());
  pipeline.on("broken", fail_with(TestError::Handler("nope".to_string())));

  pipeline.after_each_step({
    let completed = Arc::clone(&completed);
    move |step| completed.lock().unwrap().push(step.to_string())
  });

  let err = pipeline.run(state_of(json!({}))).unwrap_err();
  assert_eq!(err, TestError::Handler("nope".to_string()));
  assert_eq!(*completed.lock().unwrap(), vec!["fine".to_string()]);
}
