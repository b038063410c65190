// operon/src/core/state.rs

//! The raw working state threaded through a pipeline run.

use serde_json::{Map, Value};

/// Raw working state: a string-keyed mapping of JSON values.
///
/// One `State` is created per invocation and threaded through the step
/// list by value. A step only changes the state seen by later steps by
/// returning [`StepFlow::Commit`](crate::StepFlow::Commit); there is no
/// shared or interior mutability.
pub type State = Map<String, Value>;

/// Human-readable name of a JSON value's kind, for diagnostics.
pub(crate) fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "list",
    Value::Object(_) => "mapping",
  }
}
