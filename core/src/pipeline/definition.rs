// operon/src/pipeline/definition.rs

//! Contains the `Pipeline<Err>` struct definition and its
//! definition-time registration surface.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::control::{CatchFlow, StepFlow};
use crate::core::handler::{CatchHandler, Failure, StepHandler};
use crate::core::step::{match_any, Catch, CatchFilter, Step};
use crate::error::OperonError;
use crate::pipeline::hooks::Hooks;
use crate::schema::{Schema, StateView};

/// Default bound on redirect hops within one logical run.
pub const DEFAULT_MAX_DRIFT_HOPS: u32 = 64;

/// An ordered step pipeline with declarative compensation, generic
/// over the error type `Err` its handlers return.
///
/// `Err` must be `std::error::Error + Send + Sync + 'static` and
/// additionally `From<crate::error::OperonError>`, so that the
/// engine's own structural errors can flow into the application's
/// error type and be matched by catch filters like any other error.
///
/// A `Pipeline` is populated once at definition time (steps, catches,
/// schemas, handler bindings) and is read-only during every run; each
/// run operates on its own working [`State`](crate::State).
pub struct Pipeline<Err>
where
  Err: std::error::Error + From<OperonError> + Send + Sync + 'static,
{
  pub(crate) name: String,

  /// Ordered step descriptors; drift resolves names against this list.
  pub(crate) steps: Vec<Step>,

  /// Ordered compensating handlers, tried in declared order.
  pub(crate) catches: Vec<Catch<Err>>,

  pub(crate) schemas: HashMap<String, Schema>,

  // Handler bindings are resolved here once, at registration, instead
  // of being re-discovered by name on every call.
  pub(crate) handlers: HashMap<String, StepHandler<Err>>,
  pub(crate) catch_handlers: HashMap<String, CatchHandler<Err>>,

  pub(crate) hooks: Hooks<Err>,

  pub(crate) max_drift_hops: u32,
}

impl<Err> Pipeline<Err>
where
  Err: std::error::Error + From<OperonError> + Send + Sync + 'static,
{
  /// Creates an empty pipeline definition named `name`.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      steps: Vec::new(),
      catches: Vec::new(),
      schemas: HashMap::new(),
      handlers: HashMap::new(),
      catch_handlers: HashMap::new(),
      hooks: Hooks::default(),
      max_drift_hops: DEFAULT_MAX_DRIFT_HOPS,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn steps(&self) -> &[Step] {
    &self.steps
  }

  // --- Step registration ---

  /// Appends a required step owned by this pipeline.
  pub fn step(&mut self, name: &str) -> Result<(), OperonError> {
    self.push_step(name, true, self.name.clone())
  }

  /// Appends a step that is passed over unless a drift lands on it.
  pub fn optional_step(&mut self, name: &str) -> Result<(), OperonError> {
    self.push_step(name, false, self.name.clone())
  }

  /// Appends a step recording another pipeline as its conceptual
  /// owner. The engine never dispatches through the receiver; it is
  /// carried for diagnostics.
  pub fn step_for(&mut self, name: &str, required: bool, receiver: &str) -> Result<(), OperonError> {
    self.push_step(name, required, receiver.to_string())
  }

  fn push_step(&mut self, name: &str, required: bool, receiver: String) -> Result<(), OperonError> {
    // Drift addresses steps by name; a second step under the same
    // name would make that lookup ambiguous.
    if self.steps.iter().any(|s| s.name == name) {
      return Err(OperonError::DuplicateStepName {
        name: name.to_string(),
      });
    }
    self.steps.push(Step {
      name: name.to_string(),
      required,
      receiver,
    });
    Ok(())
  }

  // --- Catch registration ---

  /// Appends a catch handling errors accepted by `filter`.
  pub fn catch(&mut self, name: &str, filter: impl Fn(&Err) -> bool + Send + Sync + 'static) {
    self.push_catch(name, Arc::new(filter), self.name.clone());
  }

  /// Appends a catch matching every error.
  pub fn catch_all(&mut self, name: &str) {
    self.push_catch(name, match_any(), self.name.clone());
  }

  /// Appends a catch recording another pipeline as its conceptual owner.
  pub fn catch_for(&mut self, name: &str, filter: CatchFilter<Err>, receiver: &str) {
    self.push_catch(name, filter, receiver.to_string());
  }

  fn push_catch(&mut self, name: &str, filter: CatchFilter<Err>, receiver: String) {
    // Duplicate catch names are legal: catches are tried in declared
    // order, and drift never targets a catch.
    self.catches.push(Catch {
      name: name.to_string(),
      filter,
      receiver,
    });
  }

  // --- Schemas and handler bindings ---

  /// Registers the expected input shape for a step. Re-registering a
  /// name replaces the previous schema.
  pub fn schema(&mut self, name: &str, schema: Schema) {
    self.schemas.insert(name.to_string(), schema);
  }

  /// Binds the handler implementing a declared step.
  pub fn on(
    &mut self,
    name: &str,
    handler: impl Fn(StateView<'_>) -> Result<StepFlow, Err> + Send + Sync + 'static,
  ) {
    self.ensure_step_declared(name);
    self.handlers.insert(name.to_string(), Box::new(handler));
  }

  /// Binds the handler implementing a declared catch.
  pub fn on_catch(
    &mut self,
    name: &str,
    handler: impl Fn(Failure<'_, Err>) -> Result<CatchFlow, Err> + Send + Sync + 'static,
  ) {
    self.ensure_catch_declared(name);
    self.catch_handlers.insert(name.to_string(), Box::new(handler));
  }

  /// Binds the stock terminal behavior to a declared catch:
  /// unconditionally re-raise the error it received.
  pub fn on_catch_reraise(&mut self, name: &str) {
    self.on_catch(name, |_failure| Ok(CatchFlow::Reraise));
  }

  /// Caps redirect hops for one logical run. A redirect cycle fails
  /// with [`OperonError::DriftLimitExceeded`] once the cap is hit.
  pub fn set_max_drift_hops(&mut self, limit: u32) {
    self.max_drift_hops = limit;
  }

  pub(crate) fn step_index(&self, name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == name)
  }

  /// Panics if `name` was never declared. A typo here is a programming
  /// error in the pipeline definition, not a runtime condition.
  fn ensure_step_declared(&self, name: &str) {
    if !self.steps.iter().any(|s| s.name == name) {
      panic!(
        "operon setup error: step '{}' not found in pipeline '{}'",
        name, self.name
      );
    }
  }

  fn ensure_catch_declared(&self, name: &str) {
    if !self.catches.iter().any(|c| c.name == name) {
      panic!(
        "operon setup error: catch '{}' not found in pipeline '{}'",
        name, self.name
      );
    }
  }
}
