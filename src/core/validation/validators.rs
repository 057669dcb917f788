//! Reusable field validators
//!
//! Each validator receives the field name and its JSON value and returns a
//! message on failure. Values of a type the validator does not handle pass
//! through, leaving type checks to a dedicated validator.

use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

static COLUMN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").expect("column identifier pattern is valid")
});

/// Validator: string must be present and contain a non-whitespace character
pub fn required_text() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value {
        Value::Null => Err(format!("'{}' is required", field)),
        Value::String(s) if s.trim().is_empty() => Err(format!("'{}' must not be empty", field)),
        Value::String(_) => Ok(()),
        _ => Err(format!("'{}' must be a string", field)),
    }
}

/// Validator: string length (in characters) must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            let len = s.chars().count();
            if len < min {
                Err(format!(
                    "'{}' must be at least {} characters (currently: {})",
                    field, min, len
                ))
            } else if len > max {
                Err(format!(
                    "'{}' must not exceed {} characters (currently: {})",
                    field, max, len
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be a list of strings
pub fn string_list() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value {
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(()),
        _ => Err(format!("'{}' must be a list of strings", field)),
    }
}

/// Validator: list must not contain more than `max` entries
pub fn max_items(max: usize) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_array() {
        Some(items) if items.len() > max => Err(format!(
            "'{}' must not contain more than {} entries (currently: {})",
            field,
            max,
            items.len()
        )),
        _ => Ok(()),
    }
}

/// Validator: every string entry must look like a column identifier
pub fn column_identifiers() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        let Some(items) = value.as_array() else {
            return Ok(());
        };
        match items
            .iter()
            .filter_map(Value::as_str)
            .find(|s| !COLUMN_ID.is_match(s))
        {
            Some(bad) => Err(format!(
                "'{}' contains an invalid column identifier: '{}'",
                field, bad
            )),
            None => Ok(()),
        }
    }
}

/// Validator: list entries must be unique
pub fn unique_entries() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        let Some(items) = value.as_array() else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        match items.iter().find(|item| !seen.insert(item.to_string())) {
            Some(dup) => Err(format!("'{}' contains a duplicate entry: {}", field, dup)),
            None => Ok(()),
        }
    }
}
