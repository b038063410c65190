// src/lib.rs

//! Operon: a synchronous, restartable step-pipeline engine.
//!
//! Operon executes a statically declared, ordered list of named steps
//! over a mutable JSON working state, with:
//!  - Schema-gated inputs: each step declares the shape it expects and
//!    receives a typed, read-only view of the validated state.
//!  - Explicit state progression: only a `Commit` returned by a step
//!    changes what later steps see.
//!  - Declarative compensation: ordered catches match raised errors by
//!    predicate and may redirect ("drift") execution to any named
//!    step instead of aborting.
//!  - A name-keyed registry for managing and running pipelines, and
//!    for composing one pipeline from another's handlers.
//!
//! Execution is single-threaded and synchronous: `run` returns only
//! when the run (including all drift hops) completes, an unmatched or
//! re-raised error propagates, or the catch chain absorbs the error
//! into the result.

// Declare modules according to the planned structure
pub mod core;
pub mod error;
pub mod logfmt;
pub mod pipeline;
pub mod registry;
pub mod schema;

// --- Re-exports for the Public API ---

// Core types that users interact with frequently
pub use crate::core::control::{drift_to, fresh, CatchFlow, Outcome, StepFlow};
pub use crate::core::handler::{CatchHandler, Failure, StepHandler};
pub use crate::core::state::State;
pub use crate::core::step::{match_any, Catch, CatchFilter, Step};

// The main Pipeline struct and its observer hook types
pub use crate::pipeline::definition::{Pipeline, DEFAULT_MAX_DRIFT_HOPS};
pub use crate::pipeline::hooks::{CatchObserver, StepCompletion, StepObserver};

pub use crate::error::{OperonError, OperonResult};

// The registry for managing and dispatching pipelines
pub use crate::registry::Registry;

// The schema collaborator's surface
pub use crate::schema::{Field, FieldKind, Schema, SchemaError, StateView};

/*
    Core Workflow:
    1. Define an error type `MyError` implementing `std::error::Error`
       and `From<OperonError>`.
    2. Create a `Pipeline::<MyError>::new("name")`; declare steps with
       `.step()` / `.optional_step()`, catches with `.catch()` /
       `.catch_all()`, and input shapes with `.schema()`.
    3. Bind step handlers with `.on(...)` (return `fresh(..)?` to
       commit new state, `drift_to(..)` to redirect, `StepFlow::Stay`
       to leave state untouched) and catch handlers with
       `.on_catch(...)` / `.on_catch_reraise(...)`.
    4. Call `pipeline.run(raw)`, or register pipelines in a
       `Registry` and call `registry.run("name", raw)`.
    5. Inspect the `Outcome`: `Completed(state)` or `Absorbed(error)`
       (a matched-but-unresolved error returned as a value).
*/
