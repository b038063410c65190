// demos/document_flow/src/errors.rs

use operon::OperonError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("store '{store}' refused the document: {reason}")]
  Upload { store: String, reason: String },

  #[error("document failed validation: {0}")]
  Validation(String),

  #[error("pipeline engine error: {source}")]
  Workflow {
    #[from] // Allows conversion from operon::OperonError
    source: OperonError,
  },
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
