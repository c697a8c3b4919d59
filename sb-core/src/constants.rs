//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "ServiceBook";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// REST API path prefix.
pub const API_PREFIX: &str = "/api";

/// Path of the provider booking channel on the backend.
pub const REALTIME_PATH: &str = "/ws/bookings/";

/// Default server API timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Fixed delay between realtime reconnection attempts.
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 5_000;

/// Capacity of broadcast channels carrying realtime and app events.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Name of the token file inside the data directory.
pub const TOKEN_FILE_NAME: &str = "session.json";

/// Prefix of the daily rolling log file.
pub const LOG_FILE_PREFIX: &str = "servicebook.log";

/// Inbound realtime event type strings.
pub mod events {
    pub const BOOKING_REQUEST: &str = "booking_request";
    pub const BOOKING_CONFIRMED: &str = "booking_confirmed";
    pub const BOOKING_CLOSED: &str = "booking_closed";

    /// Event types the provider dashboard subscribes to.
    pub const PROVIDER: &[&str] = &[BOOKING_REQUEST, BOOKING_CONFIRMED, BOOKING_CLOSED];
}

/// Outbound realtime action strings.
pub mod actions {
    pub const ACCEPT_BOOKING: &str = "accept_booking";
    pub const REJECT_BOOKING: &str = "reject_booking";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_events() {
        assert_eq!(events::PROVIDER.len(), 3);
        assert!(events::PROVIDER.contains(&"booking_closed"));
    }
}
