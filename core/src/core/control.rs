// operon/src/core/control.rs

//! Signals handlers return to steer pipeline flow, and the outcome of a run.

use serde_json::Value;

use crate::core::state::{kind_of, State};
use crate::error::OperonError;

/// Signal from a step handler.
///
/// Anything a step wants to contribute to later steps must travel
/// through `Commit`; the working state is otherwise untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum StepFlow {
  /// Replace the working state for every subsequent step.
  Commit(State),
  /// Abandon the rest of this pass and resume from the named step.
  Drift(String),
  /// Leave the working state exactly as it was before this step ran.
  Stay,
}

/// Signal from a catch handler.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchFlow {
  /// Abandon the remaining catches and resume from the named step.
  Drift(String),
  /// Hand the original error, unchanged, to the next matching catch.
  Pass,
  /// Re-raise the original error out of the run.
  Reraise,
}

/// Outcome of a full pipeline run.
#[derive(Debug)]
pub enum Outcome<Err> {
  /// Every pass completed; carries the final working state.
  Completed(State),
  /// The matching catches ran out without a redirect or a re-raise.
  /// The error is returned as a value, not raised; a pipeline that
  /// wants failures to surface must declare a terminal reraise catch.
  Absorbed(Err),
}

impl<Err> Outcome<Err> {
  /// The final state, if the run completed.
  pub fn completed(self) -> Option<State> {
    match self {
      Outcome::Completed(state) => Some(state),
      Outcome::Absorbed(_) => None,
    }
  }

  /// The absorbed error, if the run swallowed one.
  pub fn absorbed(self) -> Option<Err> {
    match self {
      Outcome::Completed(_) => None,
      Outcome::Absorbed(error) => Some(error),
    }
  }

  pub fn is_completed(&self) -> bool {
    matches!(self, Outcome::Completed(_))
  }
}

/// Builds the state-replacement signal from a JSON value.
///
/// The value must be a JSON object; any other kind fails with
/// [`OperonError::NotAMapping`].
pub fn fresh(value: Value) -> Result<StepFlow, OperonError> {
  match value {
    Value::Object(map) => Ok(StepFlow::Commit(map)),
    other => Err(OperonError::NotAMapping {
      found: kind_of(&other),
    }),
  }
}

/// Builds the redirect signal naming the step to resume from.
///
/// Whether the target actually exists is checked when the signal is
/// interpreted; an unknown name raises
/// [`OperonError::UnknownDriftTarget`] at that point.
pub fn drift_to(to: impl Into<String>) -> StepFlow {
  StepFlow::Drift(to.into())
}
