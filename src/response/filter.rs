//! Field filtering over decoded JSON bodies
//!
//! Filtering is a key-set projection on top-level object keys. Values are
//! never inspected, so nested objects and arrays survive whole once their
//! key is selected.

use serde_json::{Map, Value};

/// Keep only `fields` in an object, or in every object of an array.
///
/// Keys keep the order GitLab sent them in. Requested fields missing from
/// the source are simply absent from the output. Array elements that are
/// not objects pass through untouched, as do scalar bodies.
pub fn filter_fields(body: Value, fields: &[&str]) -> Value {
    match body {
        Value::Object(map) => Value::Object(project(map, fields)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(project(map, fields)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn project(map: Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    map.into_iter()
        .filter(|(key, _)| fields.contains(&key.as_str()))
        .collect()
}
