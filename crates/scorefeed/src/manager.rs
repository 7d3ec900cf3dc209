//! Feed connection manager.
//!
//! Owns one logical subscription to the score feed and keeps it alive
//! indefinitely. The manager is an explicit state machine; every transport
//! failure class takes the same backoff-and-retry path and none of them are
//! fatal to the manager itself.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::backoff::Backoff;
use crate::error::{FeedError, Result};
use crate::sink::MessageSink;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Feed subscription settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket URL of the score feed.
    pub url: String,
    /// Initial reconnect delay.
    pub base_delay: Duration,
    /// Upper bound on the reconnect delay.
    pub max_delay: Duration,
}

impl FeedConfig {
    /// Create a config with the default backoff bounds (1s doubling to 60s).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Connection lifecycle states.
///
/// The live transport handle is owned by the `Connected` state, so at most
/// one handle exists at any instant. Once `ShuttingDown` is reached no
/// further connection attempts occur.
enum ConnectionState {
    /// No transport; optionally waiting out a backoff delay before retrying.
    Disconnected { retry_in: Option<Duration> },
    /// A connection attempt is in flight.
    Connecting,
    /// Reading from the live transport handle.
    Connected(Box<WsStream>),
    /// Terminal: stop flag observed.
    ShuttingDown,
}

/// Keeps a single logical feed subscription alive until shut down.
pub struct FeedManager {
    config: FeedConfig,
    sink: Arc<dyn MessageSink>,
    stop: CancellationToken,
}

impl FeedManager {
    /// Create a manager for `config`, delivering messages to `sink`.
    ///
    /// The URL is validated up front; a bad URL is a configuration error and
    /// fatal at startup rather than something to retry against forever.
    pub fn new(config: FeedConfig, sink: Arc<dyn MessageSink>) -> Result<Self> {
        let url = Url::parse(&config.url)?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(FeedError::UnsupportedScheme(other.to_string())),
        }

        Ok(Self {
            config,
            sink,
            stop: CancellationToken::new(),
        })
    }

    /// Request shutdown.
    ///
    /// Idempotent; safe to call multiple times or before any connection was
    /// ever made. Cancels any in-flight connect or read and closes the live
    /// transport handle if present.
    pub fn shutdown(&self) {
        self.stop.cancel();
    }

    /// Drive the connection state machine until [`shutdown`](Self::shutdown)
    /// is called.
    ///
    /// Blocks (as a managed background task) for the life of the
    /// subscription. Intended to be called once; typically spawned.
    pub async fn run(&self) {
        let mut backoff = Backoff::new(self.config.base_delay, self.config.max_delay);
        let mut state = ConnectionState::Disconnected { retry_in: None };

        loop {
            state = match state {
                ConnectionState::Disconnected { retry_in } => self.wait_retry(retry_in).await,
                ConnectionState::Connecting => self.connect(&mut backoff).await,
                ConnectionState::Connected(stream) => self.read(*stream, &mut backoff).await,
                ConnectionState::ShuttingDown => break,
            };
        }

        debug!(url = %self.config.url, "feed manager stopped");
    }

    /// `Disconnected`: wait out the backoff timer, then attempt a connection.
    async fn wait_retry(&self, retry_in: Option<Duration>) -> ConnectionState {
        if self.stop.is_cancelled() {
            return ConnectionState::ShuttingDown;
        }

        let Some(delay) = retry_in else {
            return ConnectionState::Connecting;
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => ConnectionState::Connecting,
            _ = self.stop.cancelled() => ConnectionState::ShuttingDown,
        }
    }

    /// `Connecting`: one connection attempt, racing shutdown.
    async fn connect(&self, backoff: &mut Backoff) -> ConnectionState {
        tokio::select! {
            result = connect_async(self.config.url.as_str()) => match result {
                Ok((stream, _)) => {
                    info!(url = %self.config.url, "connected to score feed");
                    backoff.reset();
                    self.sink.on_open().await;
                    ConnectionState::Connected(Box::new(stream))
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(error = %e, retry_in = ?delay, "feed connection failed");
                    ConnectionState::Disconnected { retry_in: Some(delay) }
                }
            },
            _ = self.stop.cancelled() => ConnectionState::ShuttingDown,
        }
    }

    /// `Connected`: forward text frames to the sink until the stream ends,
    /// errors, or shutdown is requested.
    async fn read(&self, mut stream: WsStream, backoff: &mut Backoff) -> ConnectionState {
        loop {
            tokio::select! {
                _ = self.stop.cancelled() => {
                    let _ = stream.close(None).await;
                    self.sink.on_close("shutdown").await;
                    return ConnectionState::ShuttingDown;
                }

                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        self.sink.on_message(text.as_str()).await;
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = stream.send(Message::Pong(payload)).await {
                            return self.lost(backoff, &e.to_string()).await;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .unwrap_or_else(|| "closed by server".to_string());
                        return self.lost(backoff, &reason).await;
                    }
                    Some(Ok(other)) => {
                        trace!(?other, "ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        return self.lost(backoff, &e.to_string()).await;
                    }
                    None => {
                        return self.lost(backoff, "stream ended").await;
                    }
                },
            }
        }
    }

    /// Connection lost: notify the sink and schedule the next attempt.
    async fn lost(&self, backoff: &mut Backoff, reason: &str) -> ConnectionState {
        let delay = backoff.next_delay();
        warn!(reason, retry_in = ?delay, "feed connection lost");
        self.sink.on_close(reason).await;
        ConnectionState::Disconnected {
            retry_in: Some(delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;

    #[async_trait::async_trait]
    impl MessageSink for NullSink {
        async fn on_message(&self, _raw: &str) {}
    }

    #[test]
    fn rejects_non_websocket_urls() {
        let config = FeedConfig::new("https://api.beatleader.xyz/scores");
        let result = FeedManager::new(config, Arc::new(NullSink));
        assert!(matches!(result, Err(FeedError::UnsupportedScheme(s)) if s == "https"));
    }

    #[test]
    fn rejects_malformed_urls() {
        let config = FeedConfig::new("not a url");
        assert!(matches!(
            FeedManager::new(config, Arc::new(NullSink)),
            Err(FeedError::Url(_))
        ));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_before_any_connection() {
        let config = FeedConfig::new("ws://127.0.0.1:9");
        let manager = FeedManager::new(config, Arc::new(NullSink)).unwrap();
        manager.shutdown();
        manager.shutdown();
        // run() observes the stop flag without attempting a read.
        manager.run().await;
    }
}
