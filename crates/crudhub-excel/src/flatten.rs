//! Flattening of nested JSON objects into dotted column names and back.

use serde_json::{Map, Value};

/// Flatten `object` into `(dotted key, leaf value)` pairs in field order.
///
/// Arrays and scalars are leaves; empty nested objects produce no columns.
pub fn flatten(object: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(None, object, &mut out);
    out
}

fn flatten_into(prefix: Option<&str>, object: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(Some(&path), nested, out),
            leaf => out.push((path, leaf.clone())),
        }
    }
}

/// Insert `value` at a dotted `path`, creating intermediate objects.
///
/// A path segment that already holds a non-object value is overwritten.
pub fn insert_path(object: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            object.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = object
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}
