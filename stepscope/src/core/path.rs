//! Field-path lookup on dynamic argument values.

use serde_json::Value;
use thiserror::Error;

/// A field lookup that failed partway through a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no field '{segment}' on {found} value at '{path}'")]
pub struct LookupError {
    /// Segments traversed before the failure, joined with `.`.
    pub path: String,
    /// Segment that could not be resolved.
    pub segment: String,
    /// Kind of value the segment was looked up on.
    pub found: &'static str,
}

/// Walk `segments` as field lookups starting at `value`.
///
/// Only object fields are addressable; any other value kind fails the lookup.
pub fn resolve_path(value: &Value, segments: &[&str]) -> Result<Value, LookupError> {
    let mut current = value;
    for (depth, segment) in segments.iter().enumerate() {
        let next = match current {
            Value::Object(fields) => fields.get(*segment),
            _ => None,
        };
        current = next.ok_or_else(|| LookupError {
            path: segments[..depth].join("."),
            segment: segment.to_string(),
            found: value_kind(current),
        })?;
    }
    Ok(current.clone())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
