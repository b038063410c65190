// operon/src/schema/mod.rs

//! Structural validation of raw state.
//!
//! A [`Schema`] is compiled once at definition time from a list of
//! [`Field`]s. At call time, [`Schema::check`] either returns a typed,
//! read-only [`StateView`] over the raw mapping or fails with a
//! [`SchemaError`] naming the first offending property. The engine
//! wraps that failure into
//! [`OperonError::StepSchemaMismatch`](crate::OperonError::StepSchemaMismatch);
//! nothing in this module knows about steps or pipelines.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::state::{kind_of, State};

/// The kind a declared field must have in the raw mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  /// A whole number (JSON number with no fractional part).
  Integer,
  /// Any JSON number.
  Float,
  Boolean,
  Object,
  List,
  /// Present with any kind.
  Any,
}

impl FieldKind {
  fn admits(self, value: &Value) -> bool {
    match self {
      FieldKind::Text => value.is_string(),
      FieldKind::Integer => value.is_i64() || value.is_u64(),
      FieldKind::Float => value.is_number(),
      FieldKind::Boolean => value.is_boolean(),
      FieldKind::Object => value.is_object(),
      FieldKind::List => value.is_array(),
      FieldKind::Any => true,
    }
  }

  fn label(self) -> &'static str {
    match self {
      FieldKind::Text => "text",
      FieldKind::Integer => "integer",
      FieldKind::Float => "float",
      FieldKind::Boolean => "boolean",
      FieldKind::Object => "mapping",
      FieldKind::List => "list",
      FieldKind::Any => "any",
    }
  }
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct Field {
  pub name: String,
  pub kind: FieldKind,
  pub required: bool,
}

impl Field {
  pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
    Field {
      name: name.into(),
      kind,
      required: true,
    }
  }

  pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
    Field {
      name: name.into(),
      kind,
      required: false,
    }
  }
}

/// Why a raw mapping failed a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
  #[error("missing property '{field}' (expected {expected})")]
  MissingProperty { field: String, expected: &'static str },

  #[error("invalid type for property '{field}': expected {expected}, found {found}")]
  InvalidPropertyType {
    field: String,
    expected: &'static str,
    found: &'static str,
  },
}

/// A compiled field list for one step's expected input shape.
#[derive(Debug, Clone, Default)]
pub struct Schema {
  fields: Vec<Field>,
}

impl Schema {
  /// Compiles a schema from its field declarations.
  pub fn of(fields: impl IntoIterator<Item = Field>) -> Self {
    Schema {
      fields: fields.into_iter().collect(),
    }
  }

  pub fn fields(&self) -> &[Field] {
    &self.fields
  }

  /// Validates `state` and returns a typed view over it.
  ///
  /// Fails on the first declared field that is absent (when required)
  /// or present with the wrong kind. Undeclared keys are tolerated:
  /// a schema constrains what a step reads, not what the state holds.
  pub fn check<'a>(&self, state: &'a State) -> Result<StateView<'a>, SchemaError> {
    for field in &self.fields {
      match state.get(&field.name) {
        Some(value) => {
          if !field.kind.admits(value) {
            return Err(SchemaError::InvalidPropertyType {
              field: field.name.clone(),
              expected: field.kind.label(),
              found: kind_of(value),
            });
          }
        }
        None if field.required => {
          return Err(SchemaError::MissingProperty {
            field: field.name.clone(),
            expected: field.kind.label(),
          });
        }
        None => {}
      }
    }
    Ok(StateView { state })
  }
}

/// Typed, read-only view over a validated state.
///
/// Accessors return `None` when the key is absent or of another kind;
/// for a field the schema declared required, the value is guaranteed
/// present with the declared kind.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
  state: &'a State,
}

impl<'a> StateView<'a> {
  pub fn text(&self, name: &str) -> Option<&'a str> {
    self.state.get(name).and_then(Value::as_str)
  }

  pub fn integer(&self, name: &str) -> Option<i64> {
    self.state.get(name).and_then(Value::as_i64)
  }

  pub fn float(&self, name: &str) -> Option<f64> {
    self.state.get(name).and_then(Value::as_f64)
  }

  pub fn boolean(&self, name: &str) -> Option<bool> {
    self.state.get(name).and_then(Value::as_bool)
  }

  pub fn object(&self, name: &str) -> Option<&'a Map<String, Value>> {
    self.state.get(name).and_then(Value::as_object)
  }

  pub fn list(&self, name: &str) -> Option<&'a Vec<Value>> {
    self.state.get(name).and_then(Value::as_array)
  }

  pub fn value(&self, name: &str) -> Option<&'a Value> {
    self.state.get(name)
  }

  /// The underlying raw mapping.
  pub fn raw(&self) -> &'a State {
    self.state
  }
}
