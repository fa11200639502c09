//! Dotted-path access into nested JSON records.
//!
//! Attribute names double as key paths into the record: `"server_name"`
//! addresses a top-level key, `"script.script_arguments"` a nested one.
//! Writes create intermediate objects as needed and mutate the record in
//! place; nothing outside the passed-in record is touched.

use serde_json::{Map, Value};

/// Read the value at `path`, returning `None` when any segment is missing
/// or a non-terminal segment is not an object.
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(record: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// A non-object encountered at an intermediate segment is replaced by an
/// object so the write always lands.
pub fn set(record: &mut Value, path: &str, value: Value) {
    if !record.is_object() {
        *record = Value::Object(Map::new());
    }
    let mut current = record;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Some(obj) = current.as_object_mut() else {
            return;
        };
        if segments.peek().is_none() {
            obj.insert(segment.to_string(), value);
            return;
        }
        let next = obj
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !next.is_object() {
            *next = Value::Object(Map::new());
        }
        current = next;
    }
}

/// Render a record value as comparison/display text. Scalars use their
/// plain text form so schemas may write `"5"` against a numeric field;
/// arrays and objects fall back to their JSON rendering.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Remove the value at `path`, returning it if present. Intermediate
/// objects are left in place even when emptied.
pub fn remove(record: &mut Value, path: &str) -> Option<Value> {
    match path.rsplit_once('.') {
        None => record.as_object_mut()?.remove(path),
        Some((parent, leaf)) => get_mut(record, parent)?.as_object_mut()?.remove(leaf),
    }
}
