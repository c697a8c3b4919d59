//! Shared test helpers: an in-process WebSocket server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use sb_socket::{ChannelConfig, ConnectionState, OfferChannel};

pub type ServerSocket = WebSocketStream<TcpStream>;

/// An accepted connection and the request URI it was opened with.
pub struct Accepted {
    pub uri: String,
    pub socket: ServerSocket,
}

impl Accepted {
    pub async fn send_text(&mut self, text: &str) {
        self.socket.send(Message::text(text.to_string())).await.unwrap();
    }

    /// Next text frame from the client.
    pub async fn recv_text(&mut self) -> String {
        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                other => panic!("socket ended before a text frame: {other:?}"),
            }
        }
    }
}

/// Start a server on an ephemeral port. Returns the channel endpoint URL
/// and a stream of accepted connections.
pub async fn spawn_server() -> (String, mpsc::UnboundedReceiver<Accepted>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let uri = Arc::new(Mutex::new(String::new()));
            let slot = uri.clone();
            let callback = move |req: &Request, resp: Response| {
                *slot.lock().unwrap() = req.uri().to_string();
                Ok(resp)
            };
            let Ok(socket) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
                continue;
            };
            let uri = uri.lock().unwrap().clone();
            if tx.send(Accepted { uri, socket }).is_err() {
                break;
            }
        }
    });

    (format!("ws://{addr}/ws/bookings/"), rx)
}

/// A channel with a short reconnect interval for tests.
pub fn test_channel(url: &str) -> OfferChannel {
    OfferChannel::new(ChannelConfig::new(url).with_reconnect_interval(Duration::from_millis(50)))
}

/// Wait (bounded) until the channel state satisfies `pred`.
pub async fn wait_for_state(channel: &OfferChannel, pred: impl Fn(&ConnectionState) -> bool) {
    let mut rx = channel.state_receiver();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
        .await
        .expect("timed out waiting for channel state")
        .unwrap();
}

/// Next accepted connection, bounded.
pub async fn next_conn(rx: &mut mpsc::UnboundedReceiver<Accepted>) -> Accepted {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a connection")
        .expect("server stopped")
}
