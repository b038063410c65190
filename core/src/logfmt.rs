// operon/src/logfmt.rs

//! One-line `key=value` rendering of a raw state mapping.
//!
//! Nested objects flatten into dotted namespaces, so
//! `{"document": {"id": 7}, "location": "s3://x"}` renders as
//! `document.id=7 location="s3://x"`. Used for the offending raw in
//! schema-mismatch messages and handy for single-line state logging.

use serde_json::Value;

use crate::core::state::State;

/// Renders the whole mapping as space-separated `key=value` pairs.
pub fn render(state: &State) -> String {
  let mut pairs = Vec::new();
  collect(None, state, &mut pairs);
  pairs.join(" ")
}

fn collect(namespace: Option<&str>, map: &State, out: &mut Vec<String>) {
  for (key, value) in map {
    let label = match namespace {
      Some(ns) => format!("{ns}.{key}"),
      None => key.clone(),
    };
    match value {
      Value::Object(inner) => collect(Some(&label), inner, out),
      scalar => out.push(format!("{label}={}", element(scalar))),
    }
  }
}

fn element(value: &Value) -> String {
  match value {
    // Strings render quoted; everything else in its JSON spelling.
    Value::String(text) => format!("{text:?}"),
    other => other.to_string(),
  }
}
