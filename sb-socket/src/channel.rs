//! Booking channel connection manager.
//!
//! Owns the WebSocket to the backend's booking endpoint for one provider
//! session: opens it with the session token, reopens it at a fixed
//! interval after unexpected closes, routes inbound frames to handlers
//! and subscribers, and writes outbound actions.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use sb_core::config::AppConfig;
use sb_core::constants;
use sb_core::error::{SbError, SbResult};

use crate::events::{
    ChannelEvent, ConnectionState, EventDispatcher, EventHandler, HandlerRegistry, OutboundAction,
};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Settings for an `OfferChannel`.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Channel endpoint without the token, e.g. `ws://host/ws/bookings/`.
    pub url: String,
    /// Fixed delay before each reconnection attempt.
    pub reconnect_interval: Duration,
    /// Capacity of the subscriber broadcast channel.
    pub event_capacity: usize,
}

impl ChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_interval: Duration::from_millis(constants::DEFAULT_RECONNECT_INTERVAL_MS),
            event_capacity: constants::DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Build from application configuration.
    pub fn from_app_config(config: &AppConfig) -> SbResult<Self> {
        config.validate()?;
        Ok(Self {
            url: config.realtime_url()?,
            reconnect_interval: config.realtime.reconnect_interval(),
            event_capacity: config.realtime.event_capacity,
        })
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// The endpoint with `token` attached as a query parameter.
    fn url_with_token(&self, token: &str) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}token={token}", self.url)
    }
}

/// State shared between the public handle and the session task.
struct Shared {
    handlers: HandlerRegistry,
    dispatcher: EventDispatcher,
    state_tx: watch::Sender<ConnectionState>,
    /// Writer queue of the open socket; `None` while closed.
    outbound: StdMutex<Option<mpsc::UnboundedSender<Message>>>,
}

impl Shared {
    fn set_connected(&self, connected: bool) {
        self.state_tx.send_if_modified(|state| {
            let changed = state.connected != connected;
            state.connected = connected;
            changed
        });
    }

    fn set_should_reconnect(&self, should_reconnect: bool) {
        self.state_tx.send_if_modified(|state| {
            let changed = state.should_reconnect != should_reconnect;
            state.should_reconnect = should_reconnect;
            changed
        });
    }

    fn set_outbound(&self, tx: Option<mpsc::UnboundedSender<Message>>) {
        *self
            .outbound
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = tx;
    }

    fn outbound(&self) -> Option<mpsc::UnboundedSender<Message>> {
        self.outbound
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Decode one text frame and hand it to the handler, then subscribers.
    fn route_frame(&self, text: &str) {
        let Some(event) = ChannelEvent::from_frame(text) else {
            debug!("dropping malformed frame ({} bytes)", text.len());
            return;
        };
        debug!("channel event: {}", event.event_type);
        if !self.handlers.invoke(event.clone()) {
            debug!("no handler registered for {}", event.event_type);
        }
        self.dispatcher.dispatch(event);
    }
}

/// A running session: the task plus its stop switch.
struct Session {
    id: Uuid,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// How a single open socket ended.
enum SocketEnd {
    /// `disconnect()` was called.
    Stopped,
    /// The peer closed or the transport failed.
    Dropped,
}

/// Realtime booking channel.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct OfferChannel {
    config: ChannelConfig,
    shared: Arc<Shared>,
    session: Arc<Mutex<Option<Session>>>,
}

impl OfferChannel {
    pub fn new(config: ChannelConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::default());
        let shared = Shared {
            handlers: HandlerRegistry::new(),
            dispatcher: EventDispatcher::new(config.event_capacity),
            state_tx,
            outbound: StdMutex::new(None),
        };
        Self {
            config,
            shared: Arc::new(shared),
            session: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Receive every inbound event, independent of `on` handlers.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ChannelEvent> {
        self.shared.dispatcher.subscribe()
    }

    /// Register the handler for `event_type`, replacing any earlier one.
    ///
    /// Handlers run on the channel's reader task, one at a time, and
    /// must not block.
    pub fn on<F>(&self, event_type: &str, handler: F)
    where
        F: Fn(ChannelEvent) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        self.shared.handlers.set(event_type, handler);
    }

    /// Remove the handler for `event_type`.
    pub fn off(&self, event_type: &str) {
        self.shared.handlers.remove(event_type);
    }

    /// Start a session authenticated with `token`.
    ///
    /// Does nothing while a session is already open or reconnecting.
    pub async fn connect(&self, token: &str) -> SbResult<()> {
        if token.is_empty() {
            return Err(SbError::NotAuthenticated);
        }

        let mut session = self.session.lock().await;
        if let Some(existing) = session.as_ref() {
            if !existing.task.is_finished() {
                debug!("booking channel session {} already running", existing.id);
                return Ok(());
            }
        }

        let id = Uuid::new_v4();
        let (stop_tx, stop_rx) = watch::channel(false);
        self.shared.set_should_reconnect(true);

        let url = self.config.url_with_token(token);
        let interval = self.config.reconnect_interval;
        let shared = self.shared.clone();
        info!("starting booking channel session {id} to {}", self.config.url);
        let task = tokio::spawn(run_session(id, shared, url, interval, stop_rx));

        *session = Some(Session { id, stop_tx, task });
        Ok(())
    }

    /// End the session. No reconnection follows; a later `connect`
    /// starts a fresh session.
    pub async fn disconnect(&self) {
        self.shared.set_should_reconnect(false);

        let Some(session) = self.session.lock().await.take() else {
            debug!("disconnect with no session running");
            return;
        };

        let _ = session.stop_tx.send(true);
        let mut task = session.task;
        if tokio::time::timeout(Duration::from_secs(2), &mut task).await.is_err() {
            warn!("booking channel session {} did not stop in time", session.id);
            task.abort();
        }

        self.shared.set_outbound(None);
        self.shared.set_connected(false);
        info!("booking channel session {} disconnected", session.id);
    }

    /// Write an action to the open socket.
    ///
    /// Returns `false` without queueing when the socket is not open.
    pub fn send(&self, action: OutboundAction) -> bool {
        let Some(tx) = self.shared.outbound() else {
            error!("booking channel is not connected, dropping {}", action.name());
            return false;
        };
        let text = match serde_json::to_string(&action) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to encode {}: {e}", action.name());
                return false;
            }
        };
        if tx.send(Message::text(text)).is_err() {
            error!("booking channel closed while sending {}", action.name());
            return false;
        }
        debug!("sent {} for booking {}", action.name(), action.booking_id());
        true
    }

    pub fn accept_booking(&self, booking_id: i64) -> bool {
        self.send(OutboundAction::AcceptBooking { booking_id })
    }

    pub fn reject_booking(&self, booking_id: i64) -> bool {
        self.send(OutboundAction::RejectBooking { booking_id })
    }
}

/// Resolves once a stop is requested or the owning handle is gone.
async fn stopped(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Session loop: open, pump, and reopen at a fixed interval until stopped.
async fn run_session(
    id: Uuid,
    shared: Arc<Shared>,
    url: String,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        let opened = tokio::select! {
            result = connect_async(url.as_str()) => result,
            _ = stopped(&mut stop_rx) => break,
        };

        match opened {
            Ok((stream, _)) => {
                info!("booking channel session {id} open");
                if let SocketEnd::Stopped = pump(&shared, stream, &mut stop_rx).await {
                    break;
                }
                warn!("booking channel session {id} closed unexpectedly");
            }
            Err(e) => warn!("booking channel session {id} failed to open: {e}"),
        }

        if !shared.state_tx.borrow().should_reconnect {
            break;
        }
        info!(
            "reconnecting booking channel in {:.1}s",
            interval.as_secs_f64()
        );
        tokio::select! {
            _ = sleep(interval) => {}
            _ = stopped(&mut stop_rx) => break,
        }
    }
    debug!("booking channel session {id} finished");
}

/// Drive one open socket until it closes or a stop is requested.
async fn pump(shared: &Shared, stream: WsStream, stop_rx: &mut watch::Receiver<bool>) -> SocketEnd {
    let (mut write, mut read) = stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    shared.set_outbound(Some(tx));
    shared.set_connected(true);

    let end = loop {
        tokio::select! {
            _ = stopped(stop_rx) => {
                let _ = write.send(Message::Close(None)).await;
                break SocketEnd::Stopped;
            }
            Some(message) = rx.recv() => {
                if let Err(e) = write.send(message).await {
                    warn!("booking channel write failed: {e}");
                    break SocketEnd::Dropped;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => shared.route_frame(text.as_str()),
                Some(Ok(Message::Close(_))) | None => break SocketEnd::Dropped,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("booking channel read failed: {e}");
                    break SocketEnd::Dropped;
                }
            },
        }
    };

    shared.set_outbound(None);
    shared.set_connected(false);
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_with_token() {
        let config = ChannelConfig::new("ws://localhost:8000/ws/bookings/");
        assert_eq!(
            config.url_with_token("abc"),
            "ws://localhost:8000/ws/bookings/?token=abc"
        );
        let config = ChannelConfig::new("ws://localhost:8000/ws/bookings/?v=2");
        assert_eq!(
            config.url_with_token("abc"),
            "ws://localhost:8000/ws/bookings/?v=2&token=abc"
        );
    }

    #[test]
    fn test_config_from_app_config() {
        let mut app = AppConfig::default();
        app.server.address = "https://book.example.com".into();
        app.realtime.reconnect_interval_ms = 250;
        let config = ChannelConfig::from_app_config(&app).unwrap();
        assert_eq!(config.url, "wss://book.example.com/ws/bookings/");
        assert_eq!(config.reconnect_interval, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_send_while_closed_returns_false() {
        let channel = OfferChannel::new(ChannelConfig::new("ws://127.0.0.1:9/ws/bookings/"));
        assert!(!channel.accept_booking(1));
        assert!(!channel.state().connected);
    }

    #[tokio::test]
    async fn test_connect_requires_token() {
        let channel = OfferChannel::new(ChannelConfig::new("ws://127.0.0.1:9/ws/bookings/"));
        assert!(matches!(
            channel.connect("").await,
            Err(SbError::NotAuthenticated)
        ));
    }
}
