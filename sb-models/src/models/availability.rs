//! Provider working hours and slot lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A working interval within a day, as "HH:MM" strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether `from` sorts strictly before `to`. Zero-padded "HH:MM"
    /// strings compare correctly as text.
    pub fn is_valid(&self) -> bool {
        self.from < self.to
    }
}

/// Weekly availability of the signed-in provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    /// Day name ("Monday") to working intervals. Absent days are off.
    #[serde(default)]
    pub availability: BTreeMap<String, Vec<TimeRange>>,
    /// Minutes per bookable slot.
    #[serde(default = "default_slot_duration")]
    pub slot_duration: u32,
    /// Minutes kept free between slots.
    #[serde(default = "default_buffer_time")]
    pub buffer_time: u32,
}

fn default_slot_duration() -> u32 {
    60
}

fn default_buffer_time() -> u32 {
    15
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            availability: BTreeMap::new(),
            slot_duration: default_slot_duration(),
            buffer_time: default_buffer_time(),
        }
    }
}

impl Availability {
    /// Day names whose intervals are empty or inverted.
    pub fn invalid_days(&self) -> Vec<&str> {
        self.availability
            .iter()
            .filter(|(_, ranges)| ranges.is_empty() || ranges.iter().any(|r| !r.is_valid()))
            .map(|(day, _)| day.as_str())
            .collect()
    }
}

/// Body of `POST /accounts/available-slots/`.
#[derive(Debug, Clone, Serialize)]
pub struct SlotQuery {
    pub category: String,
    pub date: String,
    pub service: i64,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
}

/// Response of an available-slots lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotAvailability {
    #[serde(default)]
    pub providers: Vec<serde_json::Value>,
    #[serde(default)]
    pub slots: Vec<serde_json::Value>,
}

impl SlotAvailability {
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}
