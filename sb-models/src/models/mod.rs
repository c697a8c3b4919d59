//! Entity model definitions.

pub mod account;
pub mod address;
pub mod admin;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod complaint;
pub mod offer;

/// Read a JSON value as an id: accepts numbers and numeric strings.
pub(crate) fn value_as_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a JSON value as display text: strings as-is, objects by their
/// `name` / `username` field, numbers as digits.
pub(crate) fn value_as_label(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("username"))
            .and_then(|v| v.as_str())
            .map(String::from),
        _ => None,
    }
}
