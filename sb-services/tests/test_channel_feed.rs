//! Dashboard wired to a live booking channel.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use common::{create_test_event_bus, wait_for_event, FakeSource};
use sb_services::event_bus::AppEvent;
use sb_services::provider::ProviderDashboard;
use sb_socket::{ChannelConfig, OfferChannel};

#[tokio::test]
async fn test_attach_run_detach() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::text(
            r#"{"type":"booking_request","booking_id":42,"service":"Plumbing"}"#.to_string(),
        ))
        .await
        .unwrap();
        ws
    });

    let channel = OfferChannel::new(
        ChannelConfig::new(format!("ws://{addr}/ws/bookings/"))
            .with_reconnect_interval(Duration::from_millis(50)),
    );
    let bus = create_test_event_bus();
    let mut events = bus.subscribe();
    let dashboard = Arc::new(ProviderDashboard::new(
        Arc::new(FakeSource::default()),
        Arc::new(channel.clone()),
        bus,
    ));

    let feed = dashboard.attach(&channel);
    let runner = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.run(feed).await })
    };
    channel.connect("tok").await.unwrap();

    wait_for_event(&mut events, |e| matches!(e, AppEvent::OfferReceived { booking_id: 42 })).await;
    assert_eq!(dashboard.pending().await[0].id, 42);
    assert!(channel.state().connected);

    let _ws = server.await.unwrap();
    dashboard.detach(&channel).await;
    tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("dashboard run did not stop after detach")
        .unwrap();
    assert!(!channel.state().should_reconnect);
}
