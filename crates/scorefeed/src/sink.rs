//! Message sink capability.

use async_trait::async_trait;

/// Consumer of feed messages, registered once with a [`FeedManager`].
///
/// [`on_message`](Self::on_message) is awaited inline by the manager's read
/// loop, so implementations must return promptly — typically by spawning a
/// task per message — or the next read is delayed.
///
/// [`FeedManager`]: crate::FeedManager
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Called after each successful (re)connection, before any message.
    async fn on_open(&self) {}

    /// Called once per received text frame, in arrival order.
    async fn on_message(&self, raw: &str);

    /// Called when the connection is lost or shut down.
    async fn on_close(&self, _reason: &str) {}
}
