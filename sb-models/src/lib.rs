//! ServiceBook Models - wire-level data model shared by the API client,
//! the realtime channel, and the service layer.
//!
//! Records mirror what the booking backend serializes. Fields the backend
//! may omit are `Option` or `#[serde(default)]` so that older or trimmed
//! payloads still decode.

pub mod models;

// Re-export key types
pub use models::account::{
    AdminProfile, Credentials, CustomerProfile, PasswordChange, ProviderProfile, Registration,
    SocialLogin, TokenPair, User, UserType,
};
pub use models::address::Address;
pub use models::admin::{AuditLog, AuditLogFilter, Material, Notification};
pub use models::availability::{Availability, SlotAvailability, SlotQuery, TimeRange};
pub use models::booking::{
    Booking, BookingRequest, BookingRequestReceipt, BookingStatus, BookingUpdate, ReviewSubmission,
};
pub use models::catalog::{ServiceCategory, ServiceItem};
pub use models::complaint::{Complaint, ComplaintStatus, NewComplaint};
pub use models::offer::{BookingOffer, OfferStatus};
