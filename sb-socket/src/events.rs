//! Booking channel event types, outbound actions, and event fan-out.
//!
//! Inbound frames are JSON objects tagged by a string `type`. Outbound
//! frames are JSON objects tagged by a string `action`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use sb_core::constants::{actions, events};

/// Event types pushed by the backend on the booking channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OfferEventType {
    /// A new booking was offered to this provider (`booking_request`).
    BookingRequest,
    /// This provider's acceptance was confirmed (`booking_confirmed`).
    BookingConfirmed,
    /// The booking went to someone else or was withdrawn (`booking_closed`).
    BookingClosed,
    /// Any other type string.
    Unknown(String),
}

impl OfferEventType {
    /// Parse an event type string from the backend.
    pub fn parse(s: &str) -> Self {
        match s {
            events::BOOKING_REQUEST => Self::BookingRequest,
            events::BOOKING_CONFIRMED => Self::BookingConfirmed,
            events::BOOKING_CLOSED => Self::BookingClosed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::BookingRequest => events::BOOKING_REQUEST,
            Self::BookingConfirmed => events::BOOKING_CONFIRMED,
            Self::BookingClosed => events::BOOKING_CLOSED,
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for OfferEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound channel event: its type plus the whole decoded frame.
#[derive(Debug, Clone)]
pub struct ChannelEvent {
    pub event_type: OfferEventType,
    /// The full frame object, `type` field included.
    pub data: serde_json::Value,
}

impl ChannelEvent {
    /// Decode a text frame.
    ///
    /// Returns `None` unless the frame is a JSON object with a string
    /// `type` field.
    pub fn from_frame(text: &str) -> Option<Self> {
        let data: serde_json::Value = serde_json::from_str(text).ok()?;
        let event_type = OfferEventType::parse(data.as_object()?.get("type")?.as_str()?);
        Some(Self { event_type, data })
    }

    /// The `booking_id` field, accepting numbers or numeric strings.
    pub fn booking_id(&self) -> Option<i64> {
        match self.data.get("booking_id")? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The human-readable `message` field, if any.
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(|v| v.as_str())
    }
}

/// Actions a provider sends back over the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundAction {
    AcceptBooking { booking_id: i64 },
    RejectBooking { booking_id: i64 },
}

impl OutboundAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AcceptBooking { .. } => actions::ACCEPT_BOOKING,
            Self::RejectBooking { .. } => actions::REJECT_BOOKING,
        }
    }

    pub fn booking_id(&self) -> i64 {
        match self {
            Self::AcceptBooking { booking_id } | Self::RejectBooking { booking_id } => *booking_id,
        }
    }
}

/// Observable connection state, owned by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionState {
    /// The socket is open.
    pub connected: bool,
    /// The channel will reopen the socket after an unexpected close.
    pub should_reconnect: bool,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.connected, self.should_reconnect) {
            (true, _) => write!(f, "connected"),
            (false, true) => write!(f, "reconnecting"),
            (false, false) => write!(f, "disconnected"),
        }
    }
}

/// Broadcast-based event dispatcher for decoupled event handling.
///
/// Every inbound event goes to every subscriber. Slow subscribers that
/// fall behind receive `RecvError::Lagged` and miss events.
#[derive(Clone)]
pub struct EventDispatcher {
    sender: broadcast::Sender<ChannelEvent>,
}

impl EventDispatcher {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.sender.subscribe()
    }

    /// Dispatch an event to all active subscribers.
    pub fn dispatch(&self, event: ChannelEvent) {
        let event_type = event.event_type.to_string();
        match self.sender.send(event) {
            Ok(count) => debug!("dispatched {event_type} to {count} subscriber(s)"),
            Err(_) => debug!("no subscribers for event {event_type}"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Callback registered for one event type.
pub type EventHandler = Arc<dyn Fn(ChannelEvent) + Send + Sync>;

/// One handler per event type; registering again replaces the previous one.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<Mutex<HashMap<String, EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event_type`, replacing any earlier one.
    pub fn set(&self, event_type: &str, handler: EventHandler) {
        let replaced = self.lock().insert(event_type.to_string(), handler).is_some();
        if replaced {
            debug!("replaced handler for {event_type}");
        }
    }

    /// Remove the handler for `event_type`, if any.
    pub fn remove(&self, event_type: &str) -> bool {
        self.lock().remove(event_type).is_some()
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.lock().contains_key(event_type)
    }

    /// Invoke the handler for this event's type. Returns whether one ran.
    ///
    /// The handler is cloned out first so it may call `set`/`remove`
    /// without deadlocking.
    pub fn invoke(&self, event: ChannelEvent) -> bool {
        let handler = self.lock().get(event.event_type.as_str()).cloned();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, EventHandler>> {
        self.handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_frame_decoding() {
        let event = ChannelEvent::from_frame(
            r#"{"type":"booking_closed","booking_id":"12","message":"Taken by another provider"}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, OfferEventType::BookingClosed);
        assert_eq!(event.booking_id(), Some(12));
        assert_eq!(event.message(), Some("Taken by another provider"));

        let unknown = ChannelEvent::from_frame(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(unknown.event_type, OfferEventType::Unknown("heartbeat".into()));
    }

    #[test]
    fn test_dispatcher_zero_capacity() {
        let dispatcher = EventDispatcher::new(0);
        let mut rx = dispatcher.subscribe();
        dispatcher.dispatch(ChannelEvent::from_frame(r#"{"type":"booking_confirmed"}"#).unwrap());
        assert_eq!(rx.try_recv().unwrap().event_type, OfferEventType::BookingConfirmed);
    }

    #[test]
    fn test_malformed_frames_rejected() {
        assert!(ChannelEvent::from_frame("not json").is_none());
        assert!(ChannelEvent::from_frame("[1,2,3]").is_none());
        assert!(ChannelEvent::from_frame(r#"{"booking_id":1}"#).is_none());
        assert!(ChannelEvent::from_frame(r#"{"type":7}"#).is_none());
    }

    #[test]
    fn test_outbound_wire_format() {
        let json = serde_json::to_value(OutboundAction::RejectBooking { booking_id: 9 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "reject_booking", "booking_id": 9})
        );
        assert_eq!(OutboundAction::AcceptBooking { booking_id: 1 }.name(), "accept_booking");
    }

    #[test]
    fn test_registry_last_registration_wins() {
        let registry = HandlerRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        registry.set(events::BOOKING_REQUEST, Arc::new(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        }));
        let s = second.clone();
        registry.set(events::BOOKING_REQUEST, Arc::new(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        }));

        let event = ChannelEvent::from_frame(r#"{"type":"booking_request","booking_id":1}"#).unwrap();
        assert!(registry.invoke(event.clone()));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        assert!(registry.remove(events::BOOKING_REQUEST));
        assert!(!registry.invoke(event));
    }

    #[tokio::test]
    async fn test_event_dispatcher() {
        let dispatcher = EventDispatcher::new(16);
        let mut rx = dispatcher.subscribe();
        dispatcher.dispatch(ChannelEvent::from_frame(r#"{"type":"booking_confirmed","booking_id":3}"#).unwrap());
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, OfferEventType::BookingConfirmed);
        assert_eq!(dispatcher.subscriber_count(), 1);
    }

    #[test]
    fn test_connection_state_display() {
        let mut state = ConnectionState::default();
        assert_eq!(state.to_string(), "disconnected");
        state.should_reconnect = true;
        assert_eq!(state.to_string(), "reconnecting");
        state.connected = true;
        assert_eq!(state.to_string(), "connected");
    }
}
