// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use once_cell::sync::Lazy;
use operon::{Field, FieldKind, OperonError, Schema, State, StateView, StepFlow};
use serde_json::Value;
use tracing::Level;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // Engine errors are stored as their Debug rendering so TestError
  // stays Eq-comparable while the variant name remains assertable.
  #[error("engine error: {0}")]
  Engine(String),

  #[error("upload failed via {0}")]
  UploadFailed(String),

  #[error("publish rejected: {0}")]
  PublishRejected(String),

  #[error("test handler failed: {0}")]
  Handler(String),
}

impl From<OperonError> for TestError {
  fn from(err: OperonError) -> Self {
    TestError::Engine(format!("{err:?}"))
  }
}

// --- State helpers ---

/// Builds a `State` from a `json!` object literal.
pub fn state_of(value: Value) -> State {
  match value {
    Value::Object(map) => map,
    other => panic!("state_of needs a JSON object, got {other}"),
  }
}

/// A schema accepting any mapping (no declared fields).
pub fn open_schema() -> Schema {
  Schema::default()
}

pub fn text_schema(name: &str) -> Schema {
  Schema::of([Field::required(name, FieldKind::Text)])
}

// --- Handler factories ---

/// A step handler committing the current state plus one extra entry.
pub fn commit_entry(
  key: &'static str,
  value: Value,
) -> impl Fn(StateView<'_>) -> Result<StepFlow, TestError> + Send + Sync + 'static {
  move |view: StateView<'_>| {
    let mut next = view.raw().clone();
    next.insert(key.to_string(), value.clone());
    Ok(StepFlow::Commit(next))
  }
}

/// A step handler that leaves the working state untouched.
pub fn stay() -> impl Fn(StateView<'_>) -> Result<StepFlow, TestError> + Send + Sync + 'static {
  |_view: StateView<'_>| Ok(StepFlow::Stay)
}

/// A step handler that raises `error` on every invocation.
pub fn fail_with(
  error: TestError,
) -> impl Fn(StateView<'_>) -> Result<StepFlow, TestError> + Send + Sync + 'static {
  move |_view: StateView<'_>| Err(error.clone())
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
