//! Saved customer addresses.

use serde::{Deserialize, Serialize};

/// An address saved on the customer's account.
///
/// `id` is absent on create and filled in by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub label: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// One-line rendering for lists.
    pub fn one_line(&self) -> String {
        [
            self.address.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip_code.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
