//! Webhook notification fan-out.
//!
//! Each configured endpoint receives the same embed document. Deliveries
//! are independent and best-effort: no retries, and a failure on one
//! endpoint never blocks the others.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use reactor::{ReactionNotification, ReactionNotifier};

/// Embed accent color.
const EMBED_COLOR: u32 = 16_719_223;

/// Rendered in place of absent links.
const NOT_AVAILABLE: &str = "N/A";

pub struct WebhookNotifier {
    client: Client,
    endpoints: Vec<String>,
}

impl WebhookNotifier {
    pub fn new(client: Client, endpoints: Vec<String>) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Build the webhook document for one notification.
    fn build_payload(notification: &ReactionNotification) -> Value {
        let n = notification;
        let link = |value: &Option<String>| {
            value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        let information = format!(
            "**Player**: {}\n**Accuracy**: {}%\n\n**Map**: {} by {} ({})\n**Replay**: {}",
            n.player_name, n.accuracy_pct, n.song_name, n.song_author, n.difficulty, n.replay_url,
        );
        let links = format!(
            "**Twitter**: {}\n**Twitch**: {}\n**Twitch Clip**: {}\n**Twitch R. Clip**: {}",
            link(&n.twitter_link),
            link(&n.twitch_link),
            link(&n.clip_link),
            link(&n.reaction_clip_link),
        );

        json!({
            "embeds": [{
                "title": "WHEN YOU SEE IT!",
                "color": EMBED_COLOR,
                "fields": [
                    { "name": "Information", "value": information },
                    { "name": "Links", "value": links },
                ],
                "image": { "url": n.cover_url },
                "thumbnail": { "url": n.avatar_url },
                "footer": {
                    "text": "wysi",
                    "icon_url": n.avatar_url,
                    "link": n.replay_url,
                },
            }]
        })
    }

    async fn deliver(&self, endpoint: &str, payload: &Value) {
        let result = self.client.post(endpoint).json(payload).send().await;
        match result {
            Ok(response) if response.status().is_success() => {
                debug!(endpoint, "webhook delivered");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(endpoint, %status, body, "webhook rejected");
            }
            Err(e) => {
                warn!(endpoint, error = %e, "webhook delivery failed");
            }
        }
    }
}

#[async_trait]
impl ReactionNotifier for WebhookNotifier {
    async fn notify(&self, notification: &ReactionNotification) {
        let payload = Self::build_payload(notification);
        let payload = &payload;
        let sends = self
            .endpoints
            .iter()
            .map(|endpoint| self.deliver(endpoint, payload));
        futures::future::join_all(sends).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn notification() -> ReactionNotification {
        ReactionNotification {
            player_name: "NanoPixel".to_string(),
            accuracy_pct: "72.7".to_string(),
            song_name: "X".to_string(),
            song_author: "Y".to_string(),
            difficulty: "Hard".to_string(),
            replay_url: "https://replay.beatleader.xyz/?scoreId=9377117".to_string(),
            twitter_link: Some("https://twitter.com/foo".to_string()),
            twitch_link: None,
            clip_link: None,
            reaction_clip_link: None,
            cover_url: "https://cdn.example.com/cover.png".to_string(),
            avatar_url: "https://cdn.example.com/avatar.png".to_string(),
        }
    }

    #[test]
    fn payload_shape_matches_the_webhook_contract() {
        let payload = WebhookNotifier::build_payload(&notification());
        let embed = &payload["embeds"][0];

        assert_eq!(embed["title"], "WHEN YOU SEE IT!");
        assert_eq!(embed["color"], 16719223);
        assert_eq!(embed["fields"][0]["name"], "Information");
        assert_eq!(embed["fields"][1]["name"], "Links");
        assert_eq!(embed["image"]["url"], "https://cdn.example.com/cover.png");
        assert_eq!(
            embed["thumbnail"]["url"],
            "https://cdn.example.com/avatar.png"
        );
        assert_eq!(embed["footer"]["text"], "wysi");

        let information = embed["fields"][0]["value"].as_str().unwrap();
        assert!(information.contains("**Player**: NanoPixel"));
        assert!(information.contains("**Accuracy**: 72.7%"));
        assert!(information.contains("X by Y (Hard)"));
        assert!(information.contains("scoreId=9377117"));
    }

    #[test]
    fn absent_links_render_as_not_available() {
        let payload = WebhookNotifier::build_payload(&notification());
        let links = payload["embeds"][0]["fields"][1]["value"]
            .as_str()
            .unwrap()
            .to_string();

        assert!(links.contains("**Twitter**: https://twitter.com/foo"));
        assert!(links.contains("**Twitch**: N/A"));
        assert!(links.contains("**Twitch Clip**: N/A"));
        assert!(links.contains("**Twitch R. Clip**: N/A"));
    }

    /// Minimal one-shot HTTP endpoint; counts hits and answers `status`.
    async fn http_endpoint(status: &'static str, hits: Arc<AtomicU32>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            hits.fetch_add(1, Ordering::SeqCst);
            // Drain the request far enough to not reset the client mid-write.
            let mut buf = [0u8; 16384];
            let mut seen = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
                if request_complete(&seen) {
                    break;
                }
            }
            let response =
                format!("HTTP/1.1 {status}\r\nconnection: close\r\ncontent-length: 0\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        });
        format!("http://{addr}")
    }

    fn request_complete(seen: &[u8]) -> bool {
        let Some(end) = seen.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&seen[..end]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        seen.len() >= end + 4 + body_len
    }

    #[tokio::test]
    async fn delivers_to_every_endpoint_even_when_one_rejects() {
        let first_hits = Arc::new(AtomicU32::new(0));
        let second_hits = Arc::new(AtomicU32::new(0));
        let first = http_endpoint("500 Internal Server Error", first_hits.clone()).await;
        let second = http_endpoint("204 No Content", second_hits.clone()).await;

        let notifier = WebhookNotifier::new(Client::new(), vec![first, second]);
        notifier.notify(&notification()).await;

        assert_eq!(first_hits.load(Ordering::SeqCst), 1);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }
}
