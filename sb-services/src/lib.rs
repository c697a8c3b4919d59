//! ServiceBook Services - client-side business logic.
//!
//! This crate provides:
//! - Offer reconciliation between pushed events and server refetches
//! - The provider dashboard driving the booking channel
//! - Session management with on-disk token persistence
//! - Event bus (typed notifications for front ends)

pub mod event_bus;
pub mod offers;
pub mod provider;
pub mod session;

// Re-export key types
pub use event_bus::{AppEvent, EventBus, NoticeLevel};
pub use offers::OfferBoard;
pub use provider::{BookingSource, DashboardFeed, OfferActions, ProviderDashboard};
pub use session::{SessionService, SessionState, TokenStore};
