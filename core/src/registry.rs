// operon/src/registry.rs

//! A name-keyed registry for managing and running pipelines.
//!
//! This is the call-time convenience surface: register each pipeline
//! once at definition time, then `run(name, raw)` from anywhere. A
//! handler composing another pipeline holds the `Arc` returned by
//! [`Registry::register`] (or looks it up) and folds that run's final
//! state into a `Commit`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{event, instrument, Level};

use crate::core::control::Outcome;
use crate::core::state::State;
use crate::error::OperonError;
use crate::pipeline::definition::Pipeline;

/// The pipeline registry. All registered pipelines share the
/// application error type `Err`.
pub struct Registry<Err>
where
  Err: std::error::Error + From<OperonError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<String, Arc<Pipeline<Err>>>>,
}

impl<Err> Registry<Err>
where
  Err: std::error::Error + From<OperonError> + Send + Sync + 'static,
{
  /// Creates a new, empty registry.
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
    }
  }

  /// Registers a pipeline under its own name and returns the shared
  /// handle. Re-registering a name replaces the previous pipeline.
  pub fn register(&self, pipeline: Pipeline<Err>) -> Arc<Pipeline<Err>> {
    let pipeline = Arc::new(pipeline);
    event!(Level::DEBUG, pipeline = %pipeline.name(), "registering pipeline");
    self
      .pipelines
      .write()
      .insert(pipeline.name().to_string(), Arc::clone(&pipeline));
    pipeline
  }

  pub fn get(&self, name: &str) -> Option<Arc<Pipeline<Err>>> {
    self.pipelines.read().get(name).cloned()
  }

  /// Runs the pipeline registered under `name` over `raw`.
  #[instrument(name = "Registry::run", skip(self, raw), err(Display))]
  pub fn run(&self, name: &str, raw: State) -> Result<Outcome<Err>, Err> {
    let pipeline = self.get(name).ok_or_else(|| {
      event!(Level::ERROR, pipeline = name, "no pipeline registered under this name");
      Err::from(OperonError::UnknownPipeline {
        name: name.to_string(),
      })
    })?;
    pipeline.run(raw)
  }
}

impl<Err> Default for Registry<Err>
where
  Err: std::error::Error + From<OperonError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
