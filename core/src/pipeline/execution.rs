// operon/src/pipeline/execution.rs

//! Contains `Pipeline::run`: the executor's pass loop and the catch
//! resolver. Drift resumption is an iterative loop over a start index
//! with a hop counter, so a redirect cycle fails the run instead of
//! growing the call stack.

use tracing::{event, instrument, span, Level};

use crate::core::control::{CatchFlow, Outcome, StepFlow};
use crate::core::handler::Failure;
use crate::core::state::State;
use crate::error::OperonError;
use crate::logfmt;
use crate::pipeline::definition::Pipeline;

/// How a single left-to-right pass over the step list ended.
enum PassEnd<Err> {
  Done(State),
  Drift { target: String, state: State },
  Raised { error: Err, state: State },
}

/// What the catch resolver decided about a raised error.
enum Resolution {
  Drift(String),
  Reraise,
  Absorbed,
  Unmatched,
}

impl<Err> Pipeline<Err>
where
  Err: std::error::Error + From<OperonError> + Send + Sync + 'static,
{
  /// Executes the pipeline over the given raw state.
  ///
  /// Returns `Ok(Outcome::Completed(state))` when every pass ran to
  /// the end, `Ok(Outcome::Absorbed(error))` when a raised error was
  /// matched by catches but neither redirected nor re-raised, and
  /// `Err(..)` when an error found no matching catch, was re-raised
  /// by a catch, or a catch raised one of its own.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub fn run(&self, raw: State) -> Result<Outcome<Err>, Err> {
    event!(Level::DEBUG, "pipeline run starting");

    // None marks a plain run: optional steps get no landing exemption,
    // not even at index 0.
    let mut start: Option<usize> = None;
    let mut working = raw;
    let mut last_step: Option<String> = None;
    let mut hops: u32 = 0;

    loop {
      match self.pass(start, working, &mut last_step) {
        PassEnd::Done(state) => {
          event!(Level::DEBUG, "pipeline run completed");
          return Ok(Outcome::Completed(state));
        }
        PassEnd::Drift { target, state } => {
          start = Some(self.land(&target, &mut hops).map_err(Err::from)?);
          working = state;
        }
        PassEnd::Raised { error, state } => {
          match self.resolve(&error, &state, last_step.as_deref())? {
            Resolution::Drift(target) => {
              start = Some(self.land(&target, &mut hops).map_err(Err::from)?);
              working = state;
            }
            Resolution::Reraise => {
              event!(Level::INFO, "catch re-raised the original error");
              return Err(error);
            }
            Resolution::Absorbed => {
              event!(Level::INFO, "catches exhausted; error absorbed into the result");
              return Ok(Outcome::Absorbed(error));
            }
            Resolution::Unmatched => {
              event!(Level::DEBUG, "no catch filter matched; error propagates");
              return Err(error);
            }
          }
        }
      }
    }
  }

  /// Resolves a drift target to its landing index, counting the hop.
  fn land(&self, target: &str, hops: &mut u32) -> Result<usize, OperonError> {
    *hops += 1;
    if *hops > self.max_drift_hops {
      event!(
        Level::ERROR,
        to = target,
        limit = self.max_drift_hops,
        "redirect chain exceeded the hop limit"
      );
      return Err(OperonError::DriftLimitExceeded {
        limit: self.max_drift_hops,
      });
    }
    match self.step_index(target) {
      Some(index) => {
        event!(Level::INFO, to = target, index, "drift lands");
        Ok(index)
      }
      None => Err(OperonError::UnknownDriftTarget {
        target: target.to_string(),
      }),
    }
  }

  /// One left-to-right pass over the step list beginning at `start`.
  fn pass(&self, start: Option<usize>, mut state: State, last_step: &mut Option<String>) -> PassEnd<Err> {
    for (index, step) in self.steps.iter().enumerate().skip(start.unwrap_or(0)) {
      // Skip rule: a non-required step runs only when a drift names it
      // as the exact landing point.
      if !step.required && start != Some(index) {
        event!(Level::TRACE, step = %step.name, index, "optional step passed over");
        continue;
      }

      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step = %step.name,
        index,
        required = step.required
      );
      let _step_guard = step_span.enter();

      let handler = match self.handlers.get(&step.name) {
        Some(handler) => handler,
        None => {
          event!(Level::ERROR, "no handler bound for step");
          return PassEnd::Raised {
            error: Err::from(OperonError::MissingTask {
              step: step.name.clone(),
              receiver: step.receiver.clone(),
            }),
            state,
          };
        }
      };

      let schema = match self.schemas.get(&step.name) {
        Some(schema) => schema,
        None => {
          event!(Level::ERROR, "no schema registered for step");
          return PassEnd::Raised {
            error: Err::from(OperonError::MissingSchema {
              step: step.name.clone(),
              receiver: step.receiver.clone(),
            }),
            state,
          };
        }
      };

      for observer in &self.hooks.before_step {
        observer(&step.name, &state);
      }

      // Retained so catches can report which step was running.
      *last_step = Some(step.name.clone());

      let flow = {
        let view = match schema.check(&state) {
          Ok(view) => view,
          Err(cause) => {
            event!(Level::ERROR, error = %cause, "working state failed the step schema");
            let error = Err::from(OperonError::StepSchemaMismatch {
              step: step.name.clone(),
              receiver: step.receiver.clone(),
              raw: logfmt::render(&state),
              source: cause,
            });
            return PassEnd::Raised { error, state };
          }
        };
        match handler(view) {
          Ok(flow) => flow,
          Err(error) => {
            event!(Level::ERROR, error = %error, "step handler raised");
            return PassEnd::Raised { error, state };
          }
        }
      };

      for observer in &self.hooks.after_step {
        observer(&step.name);
      }

      match flow {
        StepFlow::Commit(next) => {
          event!(Level::DEBUG, "state committed");
          state = next;
        }
        StepFlow::Drift(target) => {
          event!(Level::INFO, to = %target, "pass abandoned by drift");
          return PassEnd::Drift { target, state };
        }
        StepFlow::Stay => {
          event!(Level::TRACE, "no commit; state unchanged");
        }
      }
    }

    PassEnd::Done(state)
  }

  /// Threads a raised error through every declared catch whose filter
  /// matches, in declared order. Each catch sees the same, original
  /// error; return values other than a drift are discarded.
  fn resolve(&self, error: &Err, state: &State, failed_step: Option<&str>) -> Result<Resolution, Err> {
    let selected: Vec<_> = self.catches.iter().filter(|c| (c.filter)(error)).collect();
    if selected.is_empty() {
      return Ok(Resolution::Unmatched);
    }

    for catch in selected {
      let catch_span = span!(Level::INFO, "pipeline_catch", catch = %catch.name);
      let _catch_guard = catch_span.enter();

      let handler = self.catch_handlers.get(&catch.name).ok_or_else(|| {
        event!(Level::ERROR, "no handler bound for catch");
        Err::from(OperonError::MissingCatchHandler {
          name: catch.name.clone(),
          receiver: catch.receiver.clone(),
        })
      })?;

      for observer in &self.hooks.on_catch {
        observer(&catch.name, error);
      }

      match handler(Failure {
        error,
        state,
        step: failed_step,
      })? {
        CatchFlow::Drift(target) => {
          event!(Level::INFO, to = %target, "catch redirected");
          return Ok(Resolution::Drift(target));
        }
        CatchFlow::Reraise => return Ok(Resolution::Reraise),
        CatchFlow::Pass => {
          event!(Level::DEBUG, "catch passed; next catch sees the original error");
        }
      }
    }

    Ok(Resolution::Absorbed)
  }
}
