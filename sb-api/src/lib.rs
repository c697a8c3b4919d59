//! ServiceBook API - HTTP client for the booking backend REST API.
//!
//! Typed methods cover authentication, bookings, the service catalog,
//! provider availability, saved addresses, complaints, and the admin
//! back office. Every call is a single request: nothing is retried.

pub mod client;
pub mod endpoints;
pub mod response;

// Re-export key types
pub use client::ApiClient;
pub use endpoints::admin::AdminCollection;
pub use response::{error_message_from_body, ListResponse, Page};
