//! Booking records as served by the bookings endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_as_label;

/// Server-side lifecycle of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    /// Offered to one or more providers, awaiting acceptance.
    Notified,
    Accepted,
    Confirmed,
    Completed,
    Cancelled,
    /// Any status string this client does not know.
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Notified => "notified",
            Self::Accepted => "accepted",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a status string; unknown strings map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "notified" => Self::Notified,
            "accepted" => Self::Accepted,
            "confirmed" => Self::Confirmed,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Whether a provider's dashboard lists this booking as active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Accepted | Self::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking as returned by `/bookings/` and `/bookings/provider/`.
///
/// The backend has shipped both a flat shape (`service_name`,
/// `customer_name`) and a nested one (`service: {id, name}`), so the
/// nested fields are kept as raw JSON and read through accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub service: Option<serde_json::Value>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer: Option<serde_json::Value>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Display name of the booked service.
    pub fn service_label(&self) -> String {
        self.service_name
            .clone()
            .or_else(|| self.service.as_ref().and_then(value_as_label))
            .unwrap_or_default()
    }

    /// Display name of the customer.
    pub fn customer_label(&self) -> String {
        self.customer_name
            .clone()
            .or_else(|| self.customer.as_ref().and_then(value_as_label))
            .unwrap_or_default()
    }
}

/// Body of `POST /bookings/request/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub service_id: i64,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub customer_latitude: f64,
    pub customer_longitude: f64,
    pub customer_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Response of `POST /bookings/request/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequestReceipt {
    #[serde(default, alias = "id")]
    pub booking_id: Option<i64>,
    #[serde(default)]
    pub notified_providers_count: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Partial update for admin booking edits (`PATCH`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A customer's review of a completed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub rating: u8,
    #[serde(default)]
    pub feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_provider_booking() {
        let json = serde_json::json!({
            "id": 7,
            "status": "confirmed",
            "service_name": "Plumbing",
            "customer_name": "Asha",
            "scheduled_date": "2024-06-01",
            "scheduled_time": "10:00"
        });
        let booking: Booking = serde_json::from_value(json).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.service_label(), "Plumbing");
        assert_eq!(booking.customer_label(), "Asha");
        assert!(booking.status.is_active());
    }

    #[test]
    fn test_nested_booking_and_unknown_status() {
        let json = serde_json::json!({
            "id": 9,
            "status": "on_hold",
            "service": {"id": 3, "name": "Electrical"},
            "customer": {"id": 11, "username": "ravi"},
            "created_at": "2024-06-01T09:30:00Z"
        });
        let booking: Booking = serde_json::from_value(json).unwrap();
        assert_eq!(booking.status, BookingStatus::Unknown);
        assert_eq!(booking.service_label(), "Electrical");
        assert_eq!(booking.customer_label(), "ravi");
        assert!(booking.created_at.is_some());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BookingStatus::parse("Canceled"), BookingStatus::Cancelled);
        assert_eq!(BookingStatus::parse("notified"), BookingStatus::Notified);
        assert_eq!(BookingStatus::parse("???"), BookingStatus::Unknown);
        assert!(!BookingStatus::Notified.is_active());
    }

    #[test]
    fn test_booking_update_skips_unset_fields() {
        let update = BookingUpdate {
            status: Some(BookingStatus::Cancelled),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "cancelled"}));
    }
}
