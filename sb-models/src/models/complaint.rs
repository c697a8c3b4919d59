//! Customer complaints and their admin resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "resolved" => Some(Self::Resolved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complaint filed against a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: i64,
    pub booking: serde_json::Value,
    #[serde(default)]
    pub category: Option<String>,
    pub description: String,
    #[serde(default)]
    pub status: ComplaintStatus,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /complaints/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewComplaint {
    pub booking: i64,
    pub category: String,
    pub description: String,
}
