//! API endpoint modules organized by category.
//!
//! Each module adds typed methods on `ApiClient` for a group of related
//! backend endpoints.

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod complaints;
