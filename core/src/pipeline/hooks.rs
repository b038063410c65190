// operon/src/pipeline/hooks.rs

//! Observer registration: callbacks that watch a run without steering
//! it. Observers are invoked synchronously, in registration order, and
//! cannot alter state or control flow; steering belongs to handlers.

use crate::core::state::State;
use crate::error::OperonError;
use crate::pipeline::definition::Pipeline;

/// Observer invoked before each step attempt, with the step's name and
/// the working state it is about to see.
pub type StepObserver = Box<dyn Fn(&str, &State) + Send + Sync>;

/// Observer invoked after a step's handler returns without raising.
pub type StepCompletion = Box<dyn Fn(&str) + Send + Sync>;

/// Observer invoked before each selected catch runs, with the catch's
/// name and the raised error.
pub type CatchObserver<Err> = Box<dyn Fn(&str, &Err) + Send + Sync>;

pub(crate) struct Hooks<Err> {
  pub(crate) before_step: Vec<StepObserver>,
  pub(crate) after_step: Vec<StepCompletion>,
  pub(crate) on_catch: Vec<CatchObserver<Err>>,
}

impl<Err> Default for Hooks<Err> {
  fn default() -> Self {
    Hooks {
      before_step: Vec::new(),
      after_step: Vec::new(),
      on_catch: Vec::new(),
    }
  }
}

impl<Err> Pipeline<Err>
where
  Err: std::error::Error + From<OperonError> + Send + Sync + 'static,
{
  /// Registers an observer for every step attempt (fires before the
  /// schema gate, so it also sees attempts that fail validation).
  pub fn before_each_step(&mut self, observer: impl Fn(&str, &State) + Send + Sync + 'static) {
    self.hooks.before_step.push(Box::new(observer));
  }

  /// Registers an observer for every step whose handler returned
  /// without raising.
  pub fn after_each_step(&mut self, observer: impl Fn(&str) + Send + Sync + 'static) {
    self.hooks.after_step.push(Box::new(observer));
  }

  /// Registers an observer for every catch the resolver runs.
  pub fn on_each_catch(&mut self, observer: impl Fn(&str, &Err) + Send + Sync + 'static) {
    self.hooks.on_catch.push(Box::new(observer));
  }
}
