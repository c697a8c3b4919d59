//! Provider dashboard: reconciles channel events with the offer board.
//!
//! Events from the booking channel are forwarded into a queue and applied
//! one at a time by `run`, so the board never sees two events at once.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, info, warn};

use sb_api::ApiClient;
use sb_core::constants::events;
use sb_core::error::SbResult;
use sb_models::{Booking, BookingOffer};
use sb_socket::{ChannelEvent, ConnectionState, OfferChannel, OfferEventType};

use crate::event_bus::{AppEvent, EventBus, NoticeLevel};
use crate::offers::OfferBoard;

/// Where the dashboard refetches the provider's bookings from.
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn provider_bookings(&self) -> SbResult<Vec<Booking>>;
}

#[async_trait]
impl BookingSource for ApiClient {
    async fn provider_bookings(&self) -> SbResult<Vec<Booking>> {
        ApiClient::provider_bookings(self).await
    }
}

/// Where accept/reject actions are sent. Both return whether the action
/// was written to an open channel.
pub trait OfferActions: Send + Sync {
    fn accept_booking(&self, booking_id: i64) -> bool;
    fn reject_booking(&self, booking_id: i64) -> bool;
}

impl OfferActions for OfferChannel {
    fn accept_booking(&self, booking_id: i64) -> bool {
        OfferChannel::accept_booking(self, booking_id)
    }

    fn reject_booking(&self, booking_id: i64) -> bool {
        OfferChannel::reject_booking(self, booking_id)
    }
}

/// Inputs for `ProviderDashboard::run`, returned by `attach`.
pub struct DashboardFeed {
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    connection: watch::Receiver<ConnectionState>,
}

/// The provider's live view of offers and bookings.
pub struct ProviderDashboard {
    board: RwLock<OfferBoard>,
    source: Arc<dyn BookingSource>,
    actions: Arc<dyn OfferActions>,
    bus: EventBus,
}

impl ProviderDashboard {
    pub fn new(
        source: Arc<dyn BookingSource>,
        actions: Arc<dyn OfferActions>,
        bus: EventBus,
    ) -> Self {
        Self {
            board: RwLock::new(OfferBoard::new()),
            source,
            actions,
            bus,
        }
    }

    /// A copy of the current board.
    pub async fn snapshot(&self) -> OfferBoard {
        self.board.read().await.clone()
    }

    pub async fn pending(&self) -> Vec<BookingOffer> {
        self.board.read().await.pending().to_vec()
    }

    pub async fn active(&self) -> Vec<BookingOffer> {
        self.board.read().await.active().to_vec()
    }

    /// Apply one channel event to the board.
    pub async fn handle_event(&self, event: ChannelEvent) {
        match event.event_type {
            OfferEventType::BookingRequest => {
                let offer = match BookingOffer::from_request_payload(&event.data) {
                    Ok(offer) => offer,
                    Err(e) => {
                        debug!("ignoring booking request: {e}");
                        return;
                    }
                };
                let booking_id = offer.id;
                if !self.board.write().await.on_request(offer) {
                    return;
                }
                info!("new booking request {booking_id}");
                self.bus.emit(AppEvent::OfferReceived { booking_id });
                self.bus.notice(NoticeLevel::Info, "New booking request!");
                self.emit_board_changed().await;
            }
            OfferEventType::BookingConfirmed => {
                let Some(booking_id) = event.booking_id() else {
                    debug!("ignoring booking_confirmed without booking_id");
                    return;
                };
                self.board.write().await.on_confirmed(booking_id);
                info!("booking {booking_id} confirmed");
                self.bus.notice(
                    NoticeLevel::Success,
                    event.message().unwrap_or("Booking confirmed!"),
                );
                // The active list only ever comes from the server.
                let _ = self.refresh().await;
                self.bus.emit(AppEvent::OfferConfirmed { booking_id });
            }
            OfferEventType::BookingClosed => {
                let Some(booking_id) = event.booking_id() else {
                    debug!("ignoring booking_closed without booking_id");
                    return;
                };
                self.board.write().await.on_closed(booking_id);
                info!("booking {booking_id} closed");
                let message = event.message().map(String::from);
                if let Some(text) = &message {
                    self.bus.notice(NoticeLevel::Info, text.clone());
                }
                self.bus.emit(AppEvent::OfferClosed {
                    booking_id,
                    message,
                });
                self.emit_board_changed().await;
            }
            OfferEventType::Unknown(ref kind) => {
                debug!("ignoring channel event {kind}");
            }
        }
    }

    /// Accept an offer. The offer stays pending, marked as accepted,
    /// until the server confirms or closes it.
    pub async fn accept(&self, booking_id: i64) -> bool {
        let sent = self.actions.accept_booking(booking_id);
        if sent {
            self.board.write().await.mark_accepted(booking_id);
            self.emit_board_changed().await;
        } else {
            self.bus
                .notice(NoticeLevel::Error, "Not connected; booking not accepted");
        }
        sent
    }

    /// Reject an offer. It leaves the pending list before the action is
    /// sent and is not restored if the send fails.
    pub async fn reject(&self, booking_id: i64) -> bool {
        let removed = self.board.write().await.reject(booking_id);
        if removed.is_some() {
            self.emit_board_changed().await;
        }
        let sent = self.actions.reject_booking(booking_id);
        if !sent {
            warn!("reject for booking {booking_id} was not sent");
            self.bus
                .notice(NoticeLevel::Warning, "Not connected; rejection not sent");
        }
        sent
    }

    /// Refetch the provider's bookings and rebuild both lists.
    ///
    /// On failure the board is left as it was and a notice is emitted.
    pub async fn refresh(&self) -> SbResult<()> {
        match self.source.provider_bookings().await {
            Ok(bookings) => {
                self.board.write().await.replace_from_server(&bookings);
                self.emit_board_changed().await;
                Ok(())
            }
            Err(e) => {
                warn!("failed to load provider bookings: {e}");
                if e.is_auth_failure() {
                    self.bus.emit(AppEvent::SessionExpired);
                } else {
                    self.bus
                        .notice(NoticeLevel::Error, format!("Failed to load bookings: {e}"));
                }
                Err(e)
            }
        }
    }

    /// Register the dashboard's handlers on `channel`.
    ///
    /// Events are queued for `run`; the handlers never touch the board
    /// directly.
    pub fn attach(&self, channel: &OfferChannel) -> DashboardFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        for event_type in events::PROVIDER {
            let tx = tx.clone();
            channel.on(event_type, move |event| {
                let _ = tx.send(event);
            });
        }
        DashboardFeed {
            events: rx,
            connection: channel.state_receiver(),
        }
    }

    /// Remove the dashboard's handlers and end the channel session.
    pub async fn detach(&self, channel: &OfferChannel) {
        for event_type in events::PROVIDER {
            channel.off(event_type);
        }
        channel.disconnect().await;
    }

    /// Apply queued events until the feed closes (after `detach`).
    pub async fn run(&self, feed: DashboardFeed) {
        let DashboardFeed {
            mut events,
            mut connection,
        } = feed;
        let mut watching = true;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                changed = connection.changed(), if watching => match changed {
                    Ok(()) => {
                        let connected = connection.borrow_and_update().connected;
                        self.bus.emit(AppEvent::ConnectionStateChanged { connected });
                    }
                    Err(_) => watching = false,
                },
            }
        }
        debug!("provider dashboard feed closed");
    }

    async fn emit_board_changed(&self) {
        let board = self.board.read().await;
        self.bus.emit(AppEvent::BoardChanged {
            pending: board.pending().len(),
            active: board.active().len(),
        });
    }
}
