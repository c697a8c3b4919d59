//! ServiceBook Socket - realtime booking channel for providers.
//!
//! This crate provides the WebSocket connection manager that handles:
//! - Token-authenticated connection to the backend's booking endpoint
//! - Reconnection at a fixed interval until explicitly disconnected
//! - One handler per inbound event type, plus broadcast subscribers
//! - Outbound accept/reject actions, sent only while the socket is open

pub mod channel;
pub mod events;

// Re-export key types
pub use channel::{ChannelConfig, OfferChannel};
pub use events::{
    ChannelEvent, ConnectionState, EventDispatcher, EventHandler, HandlerRegistry,
    OfferEventType, OutboundAction,
};
