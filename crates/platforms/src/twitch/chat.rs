//! Twitch chat session: IRC over WebSocket.
//!
//! One authenticated session is opened at startup and shared by every
//! pipeline run. Writes are serialized behind a mutex; a background read
//! task answers server PINGs so the session stays alive between reactions.

use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use tracing::{debug, trace, warn};

use reactor::ServiceError;

/// Twitch IRC-over-WebSocket endpoint.
pub const DEFAULT_CHAT_URL: &str = "wss://irc-ws.chat.twitch.tv:443";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;

fn join_line(channel: &str) -> String {
    format!("JOIN #{}", channel.to_ascii_lowercase())
}

fn part_line(channel: &str) -> String {
    format!("PART #{}", channel.to_ascii_lowercase())
}

fn privmsg_line(channel: &str, text: &str) -> String {
    format!("PRIVMSG #{} :{}", channel.to_ascii_lowercase(), text)
}

/// The PONG reply for a server PING line, payload included.
fn pong_for(line: &str) -> Option<String> {
    line.strip_prefix("PING").map(|rest| format!("PONG{rest}"))
}

/// Long-lived authenticated chat connection.
pub struct ChatSession {
    writer: Arc<Mutex<WsWriter>>,
    reader: JoinHandle<()>,
}

impl ChatSession {
    /// Connect and authenticate against the default chat endpoint.
    pub async fn connect(login: &str, access_token: &str) -> Result<Self, ServiceError> {
        Self::connect_to(DEFAULT_CHAT_URL, login, access_token).await
    }

    /// Connect to a specific endpoint (used by tests).
    pub async fn connect_to(url: &str, login: &str, access_token: &str) -> Result<Self, ServiceError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ServiceError::chat(e.to_string()))?;
        let (sink, source) = stream.split();
        let writer = Arc::new(Mutex::new(sink));

        // Authenticate before anything else; the server closes the socket on
        // any other first command.
        {
            let mut w = writer.lock().await;
            w.send(Message::text(format!("PASS oauth:{access_token}")))
                .await
                .map_err(|e| ServiceError::chat(e.to_string()))?;
            w.send(Message::text(format!("NICK {login}")))
                .await
                .map_err(|e| ServiceError::chat(e.to_string()))?;
        }

        let reader = tokio::spawn(read_loop(source, writer.clone()));
        Ok(Self { writer, reader })
    }

    pub async fn join(&self, channel: &str) -> Result<(), ServiceError> {
        self.send_line(join_line(channel)).await
    }

    pub async fn part(&self, channel: &str) -> Result<(), ServiceError> {
        self.send_line(part_line(channel)).await
    }

    pub async fn privmsg(&self, channel: &str, text: &str) -> Result<(), ServiceError> {
        self.send_line(privmsg_line(channel, text)).await
    }

    async fn send_line(&self, line: String) -> Result<(), ServiceError> {
        self.writer
            .lock()
            .await
            .send(Message::text(line))
            .await
            .map_err(|e| ServiceError::chat(e.to_string()))
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Drain inbound lines: answer PINGs, log notices, discard the rest.
async fn read_loop(mut source: SplitStream<WsStream>, writer: Arc<Mutex<WsWriter>>) {
    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                for line in text.as_str().lines() {
                    if let Some(pong) = pong_for(line) {
                        if writer.lock().await.send(Message::text(pong)).await.is_err() {
                            warn!("chat session lost while answering ping");
                            return;
                        }
                    } else if line.contains("NOTICE") {
                        debug!(line, "chat notice");
                    } else {
                        trace!(line, "chat line");
                    }
                }
            }
            Ok(Message::Close(frame)) => {
                warn!(?frame, "chat session closed by server");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "chat session read failed");
                return;
            }
        }
    }
    warn!("chat session stream ended");
}
