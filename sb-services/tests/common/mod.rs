//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use sb_core::error::{SbError, SbResult};
use sb_models::Booking;
use sb_services::event_bus::{AppEvent, EventBus};
use sb_services::provider::{BookingSource, OfferActions, ProviderDashboard};
use sb_socket::ChannelEvent;

/// Create an EventBus with a small buffer suitable for tests.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(64)
}

/// Booking source that counts fetches and serves a fixed list.
#[derive(Default)]
pub struct FakeSource {
    pub calls: AtomicUsize,
    pub bookings: Mutex<Vec<Booking>>,
    pub failure: Mutex<Option<fn() -> SbError>>,
}

impl FakeSource {
    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: Mutex::new(bookings),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, make: fn() -> SbError) {
        *self.failure.lock().unwrap() = Some(make);
    }
}

#[async_trait]
impl BookingSource for FakeSource {
    async fn provider_bookings(&self) -> SbResult<Vec<Booking>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = *self.failure.lock().unwrap() {
            return Err(make());
        }
        Ok(self.bookings.lock().unwrap().clone())
    }
}

/// Action sink that records what was sent and can pretend to be offline.
pub struct FakeActions {
    pub sent: Mutex<Vec<(&'static str, i64)>>,
    pub online: AtomicBool,
}

impl FakeActions {
    pub fn new(online: bool) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            online: AtomicBool::new(online),
        }
    }

    pub fn sent(&self) -> Vec<(&'static str, i64)> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, action: &'static str, booking_id: i64) -> bool {
        if !self.online.load(Ordering::SeqCst) {
            return false;
        }
        self.sent.lock().unwrap().push((action, booking_id));
        true
    }
}

impl OfferActions for FakeActions {
    fn accept_booking(&self, booking_id: i64) -> bool {
        self.record("accept_booking", booking_id)
    }

    fn reject_booking(&self, booking_id: i64) -> bool {
        self.record("reject_booking", booking_id)
    }
}

pub fn booking(id: i64, status: &str) -> Booking {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "status": status,
        "service_name": "Plumbing",
        "customer_name": "Asha",
    }))
    .unwrap()
}

pub fn event(frame: serde_json::Value) -> ChannelEvent {
    ChannelEvent::from_frame(&frame.to_string()).unwrap()
}

pub fn request(id: i64) -> ChannelEvent {
    event(serde_json::json!({
        "type": "booking_request",
        "booking_id": id,
        "service": "Plumbing",
        "customer_name": "Asha",
        "address": "12 Lake Rd",
        "scheduled_date": "2024-06-01",
        "scheduled_time": "10:00",
    }))
}

pub struct Harness {
    pub dashboard: ProviderDashboard,
    pub source: Arc<FakeSource>,
    pub actions: Arc<FakeActions>,
    pub events: broadcast::Receiver<AppEvent>,
}

pub fn harness(source: FakeSource, online: bool) -> Harness {
    let bus = create_test_event_bus();
    let events = bus.subscribe();
    let source = Arc::new(source);
    let actions = Arc::new(FakeActions::new(online));
    let dashboard = ProviderDashboard::new(source.clone(), actions.clone(), bus);
    Harness {
        dashboard,
        source,
        actions,
        events,
    }
}

/// Drain already-emitted events without waiting.
pub fn drain(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

/// Wait (bounded) for the first event matching `pred`.
pub async fn wait_for_event(
    rx: &mut broadcast::Receiver<AppEvent>,
    pred: impl Fn(&AppEvent) -> bool,
) -> AppEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.unwrap();
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
