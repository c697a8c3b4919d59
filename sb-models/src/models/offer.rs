//! Booking offers as seen by a provider.
//!
//! An offer enters the client through a `booking_request` push or a
//! provider bookings refetch. Its status only becomes `confirmed` or
//! `closed` on server word; local accept/reject are provisional.

use serde::{Deserialize, Serialize};

use sb_core::error::{SbError, SbResult};

use super::booking::{Booking, BookingStatus};
use super::{value_as_id, value_as_label};

/// Where an offer stands from the provider's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Notified,
    Accepted,
    Rejected,
    Confirmed,
    Closed,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notified => "notified",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Confirmed => "confirmed",
            Self::Closed => "closed",
        }
    }

    /// Whether this status was set by the server rather than a local action.
    pub fn is_server_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Closed)
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BookingStatus> for OfferStatus {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Accepted => Self::Accepted,
            BookingStatus::Confirmed | BookingStatus::Completed => Self::Confirmed,
            BookingStatus::Cancelled => Self::Closed,
            BookingStatus::Pending | BookingStatus::Notified | BookingStatus::Unknown => {
                Self::Notified
            }
        }
    }
}

/// A booking offer pushed to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingOffer {
    pub id: i64,
    pub service: String,
    pub customer_name: String,
    pub address: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: OfferStatus,
}

impl BookingOffer {
    /// Build an offer from a `booking_request` push payload.
    ///
    /// `booking_id` is required. The remaining fields are optional and
    /// accept the aliases the backend has used (`service_name`,
    /// `customer`, `customer_address`). A combined ISO `scheduled_time`
    /// without a `scheduled_date` is split into date and time.
    pub fn from_request_payload(data: &serde_json::Value) -> SbResult<Self> {
        let id = data
            .get("booking_id")
            .and_then(value_as_id)
            .ok_or_else(|| SbError::MalformedPayload("booking_request missing booking_id".into()))?;

        let text = |keys: &[&str]| -> String {
            keys.iter()
                .filter_map(|k| data.get(*k))
                .find_map(value_as_label)
                .unwrap_or_default()
        };

        let mut scheduled_date = text(&["scheduled_date"]);
        let mut scheduled_time = text(&["scheduled_time"]);
        if scheduled_date.is_empty() {
            if let Some((date, time)) = scheduled_time.split_once('T') {
                let time = time.trim_end_matches('Z').to_string();
                scheduled_date = date.to_string();
                scheduled_time = time;
            }
        }

        let notes = data
            .get("notes")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(Self {
            id,
            service: text(&["service", "service_name"]),
            customer_name: text(&["customer_name", "customer"]),
            address: text(&["address", "customer_address"]),
            scheduled_date,
            scheduled_time,
            notes,
            status: OfferStatus::Notified,
        })
    }

    /// Build an offer view of a server booking record.
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            service: booking.service_label(),
            customer_name: booking.customer_label(),
            address: booking.customer_address.clone().unwrap_or_default(),
            scheduled_date: booking.scheduled_date.clone().unwrap_or_default(),
            scheduled_time: booking.scheduled_time.clone().unwrap_or_default(),
            notes: booking.notes.clone().filter(|n| !n.is_empty()),
            status: booking.status.into(),
        }
    }
}
