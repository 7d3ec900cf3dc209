//! Integration tests driving the manager against loopback WebSocket servers.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;

use scorefeed::{FeedConfig, FeedManager, MessageSink};

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
    opens: AtomicU32,
    closes: AtomicU32,
}

#[async_trait::async_trait]
impl MessageSink for RecordingSink {
    async fn on_open(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_message(&self, raw: &str) {
        self.messages.lock().unwrap().push(raw.to_string());
    }

    async fn on_close(&self, _reason: &str) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl RecordingSink {
    fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

async fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let check = async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(deadline, check).await.is_ok()
}

fn fast_config(addr: std::net::SocketAddr) -> FeedConfig {
    FeedConfig {
        url: format!("ws://{addr}"),
        base_delay: Duration::from_millis(50),
        max_delay: Duration::from_millis(200),
    }
}

#[tokio::test]
async fn delivers_messages_in_arrival_order() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        for text in ["one", "two", "three"] {
            ws.send(Message::text(text)).await.unwrap();
        }
        // Hold the connection open until the client goes away.
        while ws.next().await.is_some() {}
    });

    let sink = Arc::new(RecordingSink::default());
    let manager = Arc::new(FeedManager::new(fast_config(addr), sink.clone()).unwrap());
    let run = tokio::spawn({
        let manager = manager.clone();
        async move { manager.run().await }
    });

    assert!(wait_until(Duration::from_secs(5), || sink.message_count() == 3).await);
    assert_eq!(
        *sink.messages.lock().unwrap(),
        vec!["one".to_string(), "two".to_string(), "three".to_string()]
    );

    manager.shutdown();
    timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert_eq!(sink.opens.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reconnects_after_server_drops_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // First connection: one message, then an abrupt drop.
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::text("first")).await.unwrap();
        drop(ws);

        // Second connection after the client backs off and retries.
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::text("second")).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let sink = Arc::new(RecordingSink::default());
    let manager = Arc::new(FeedManager::new(fast_config(addr), sink.clone()).unwrap());
    let run = tokio::spawn({
        let manager = manager.clone();
        async move { manager.run().await }
    });

    assert!(wait_until(Duration::from_secs(5), || sink.message_count() == 2).await);
    assert_eq!(sink.opens.load(Ordering::SeqCst), 2);
    assert!(sink.closes.load(Ordering::SeqCst) >= 1);

    manager.shutdown();
    timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_before_first_connection_terminates_run() {
    // Grab a port with nothing listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = Arc::new(RecordingSink::default());
    let manager = Arc::new(FeedManager::new(fast_config(addr), sink.clone()).unwrap());
    let run = tokio::spawn({
        let manager = manager.clone();
        async move { manager.run().await }
    });

    manager.shutdown();
    timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert_eq!(sink.message_count(), 0);
}

#[tokio::test]
async fn shutdown_while_connected_closes_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        // Drain until the client's close handshake (or disconnect) ends the stream.
        while let Some(Ok(frame)) = ws.next().await {
            if matches!(frame, Message::Close(_)) {
                break;
            }
        }
    });

    let sink = Arc::new(RecordingSink::default());
    let manager = Arc::new(FeedManager::new(fast_config(addr), sink.clone()).unwrap());
    let run = tokio::spawn({
        let manager = manager.clone();
        async move { manager.run().await }
    });

    assert!(wait_until(Duration::from_secs(5), || sink.opens.load(Ordering::SeqCst) == 1).await);

    manager.shutdown();
    // Repeated shutdown is a no-op.
    manager.shutdown();

    timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
}
