//! Typed event bus for intra-service communication.
//!
//! Uses tokio broadcast channels to decouple services from the front end.
//! Services emit events without knowing who is listening, and any number
//! of subscribers consume them independently.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application-level events.
///
/// These are distinct from raw channel events: they describe state changes
/// the front end should react to.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A new offer was added to the pending list.
    OfferReceived { booking_id: i64 },
    /// The server confirmed this provider; the active list was refetched.
    OfferConfirmed { booking_id: i64 },
    /// The offer went elsewhere or was withdrawn.
    OfferClosed {
        booking_id: i64,
        message: Option<String>,
    },
    /// The pending/active lists changed.
    BoardChanged { pending: usize, active: usize },
    /// Booking channel connection state changed.
    ConnectionStateChanged { connected: bool },
    /// A session started or ended.
    SessionChanged {
        authenticated: bool,
        username: Option<String>,
    },
    /// A protected request was rejected; stored tokens are no longer valid.
    SessionExpired,
    /// A short-lived message for the user.
    Notice { level: NoticeLevel, message: String },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Every subscriber gets every event. Slow subscribers that fall behind
/// receive a `Lagged` error and miss events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Emit a `Notice`.
    pub fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(AppEvent::Notice {
            level,
            message: message.into(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Human-readable label for an event (for logging).
fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::OfferReceived { .. } => "OfferReceived",
        AppEvent::OfferConfirmed { .. } => "OfferConfirmed",
        AppEvent::OfferClosed { .. } => "OfferClosed",
        AppEvent::BoardChanged { .. } => "BoardChanged",
        AppEvent::ConnectionStateChanged { .. } => "ConnectionStateChanged",
        AppEvent::SessionChanged { .. } => "SessionChanged",
        AppEvent::SessionExpired => "SessionExpired",
        AppEvent::Notice { .. } => "Notice",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::OfferReceived { booking_id: 42 });

        match rx.recv().await.unwrap() {
            AppEvent::OfferReceived { booking_id } => assert_eq!(booking_id, 42),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_event_bus_fan_out() {
        let bus = EventBus::new(16);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.notice(NoticeLevel::Warning, "channel offline");

        for rx in [&mut a, &mut b] {
            match rx.recv().await.unwrap() {
                AppEvent::Notice { level, message } => {
                    assert_eq!(level, NoticeLevel::Warning);
                    assert_eq!(message, "channel offline");
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(4);
        bus.emit(AppEvent::SessionExpired);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
