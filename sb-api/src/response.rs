//! Response shapes shared across endpoints.
//!
//! List endpoints return either a bare JSON array or a paginated
//! envelope, depending on whether pagination is enabled server-side.

use serde::{Deserialize, Serialize};

/// A list response in either of the backend's two shapes.
///
/// ```json
/// [ {...}, {...} ]
/// { "count": 2, "next": null, "previous": null, "results": [ ... ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Paginated(Page<T>),
}

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> ListResponse<T> {
    /// The items regardless of envelope.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Plain(items) => items,
            Self::Paginated(page) => page.results,
        }
    }

    /// Total count reported by the server, or the item count.
    pub fn total(&self) -> u64 {
        match self {
            Self::Plain(items) => items.len() as u64,
            Self::Paginated(page) => page.count.unwrap_or(page.results.len() as u64),
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Looks at `error`, then `detail`, then `message`, then the first
/// field-level validation error (`{"username": ["already taken"]}`).
pub fn error_message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;

    for key in ["error", "detail", "message"] {
        if let Some(s) = obj.get(key).and_then(|v| v.as_str()) {
            return Some(s.to_string());
        }
    }

    obj.iter().find_map(|(field, v)| {
        let first = match v {
            serde_json::Value::Array(items) => items.first()?.as_str()?,
            serde_json::Value::String(s) => s.as_str(),
            _ => return None,
        };
        Some(format!("{field}: {first}"))
    })
}
