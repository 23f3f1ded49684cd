//! Serialization normalization.
//!
//! A vector's `jwe` field holds either a compact serialization (a JSON
//! string) or a structured JSON serialization (an object). The harness
//! always hands the implementation under test a single string.

use serde_json::Value;

/// Flatten a `jwe` field to one string.
///
/// Primitive values pass through verbatim: compactness is part of what is
/// under test, so the compact form must not be re-encoded. Structured
/// values render as their canonical JSON text.
#[must_use]
pub fn flatten_jwe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
