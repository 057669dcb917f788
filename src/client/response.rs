//! Error message extraction from non-2xx response bodies

use crate::core::error::fallback_message;
use serde_json::Value;

/// Pick a displayable message out of an error body
///
/// Looks at `message`, then `detail` (a string, or a list of `{"msg": ...}`
/// entries), then `error`. Bodies that are empty, not JSON, or carry none
/// of those produce the generic status message.
pub fn error_message_from_body(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| message_from_value(&value))
        .unwrap_or_else(|| fallback_message(status))
}

fn message_from_value(value: &Value) -> Option<String> {
    let object = value.as_object()?;

    non_empty(object.get("message"))
        .or_else(|| object.get("detail").and_then(detail_message))
        .or_else(|| non_empty(object.get("error")))
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(_) => non_empty(Some(detail)),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .map(str::trim)
                .filter(|msg| !msg.is_empty())
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
