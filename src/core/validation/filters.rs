//! Reusable field filters
//!
//! These filters normalize payload values before validation

use anyhow::Result;
use serde_json::Value;

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: trim every string entry of a list and drop the blank ones
pub fn trim_entries() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => {
                        let trimmed = s.trim();
                        (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
                    }
                    other => Some(other),
                })
                .collect(),
        )),
        other => Ok(other),
    }
}
