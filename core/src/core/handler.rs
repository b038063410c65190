// operon/src/core/handler.rs

//! Handler types for steps and catches.
//!
//! A step handler receives the schema-validated view of the working
//! state and answers with a [`StepFlow`]; a catch handler receives the
//! [`Failure`] bundle and answers with a [`CatchFlow`]. The engine only
//! inspects the shape of these answers and whether a handler raised;
//! everything else a handler does is opaque application code.

use crate::core::control::{CatchFlow, StepFlow};
use crate::core::state::State;
use crate::schema::StateView;

/// Boxed step handler: typed view in, flow signal out.
///
/// Returning `Ok(StepFlow::Stay)` (or committing nothing) leaves the
/// working state exactly as it was before the step ran, even if the
/// handler derived new data; only `Commit` carries state forward.
pub type StepHandler<Err> = Box<dyn Fn(StateView<'_>) -> Result<StepFlow, Err> + Send + Sync>;

/// What a catch handler is invoked with.
pub struct Failure<'a, Err> {
  /// The raised error. Every catch in a chain sees the same, original
  /// error; a catch cannot alter what the next catch receives.
  pub error: &'a Err,
  /// Working state as of just before the failing step.
  pub state: &'a State,
  /// Name of the most recently attempted step, if any step ran.
  pub step: Option<&'a str>,
}

/// Boxed catch handler.
///
/// Raising a *new* error is returning `Err(..)`; re-raising the
/// original is `Ok(CatchFlow::Reraise)` (the resolver owns the
/// original and returns it on the handler's behalf).
pub type CatchHandler<Err> = Box<dyn Fn(Failure<'_, Err>) -> Result<CatchFlow, Err> + Send + Sync>;
