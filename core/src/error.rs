// operon/src/error.rs

use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::schema::SchemaError;

/// The engine's error taxonomy.
///
/// Structural errors (`MissingTask`, `MissingSchema`,
/// `MissingCatchHandler`, `StepSchemaMismatch`) are raised at call
/// time and flow through the catch resolver like any domain error; a
/// broad enough catch filter will absorb them. `UnknownDriftTarget`,
/// `DriftLimitExceeded` and `DuplicateStepName` are definition bugs
/// and never enter the resolver.
#[derive(Debug, Error)]
pub enum OperonError {
  #[error("expected step '{step}' to have a handler but the receiver '{receiver}' does not bind one")]
  MissingTask { step: String, receiver: String },

  #[error("expected step '{step}' to have a schema but the receiver '{receiver}' does not register one")]
  MissingSchema { step: String, receiver: String },

  #[error("expected catch '{name}' to have a handler but the receiver '{receiver}' does not bind one")]
  MissingCatchHandler { name: String, receiver: String },

  #[error("{receiver}#{step}: {source} and received {raw}")]
  StepSchemaMismatch {
    step: String,
    receiver: String,
    /// The offending mapping, rendered through [`crate::logfmt`].
    raw: String,
    #[source]
    source: SchemaError,
  },

  #[error("drift names unknown step '{target}'")]
  UnknownDriftTarget { target: String },

  #[error("duplicate step name '{name}' in pipeline definition")]
  DuplicateStepName { name: String },

  #[error("redirect chain exceeded {limit} hops")]
  DriftLimitExceeded { limit: u32 },

  #[error("no pipeline registered under '{name}'")]
  UnknownPipeline { name: String },

  #[error("fresh state must be a mapping, got {found}")]
  NotAMapping { found: &'static str },

  #[error("error in user-provided handler or external operation. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

// The conversion the engine provides for opaque external errors:
// anything a handler bubbles up through anyhow lands in Handler.
impl From<AnyhowError> for OperonError {
  fn from(err: AnyhowError) -> Self {
    OperonError::Handler { source: err }
  }
}

pub type OperonResult<T, E = OperonError> = std::result::Result<T, E>;
