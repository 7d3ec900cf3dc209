//! Service seams for the external collaborators.
//!
//! The pipeline only ever talks to these traits; concrete platform clients
//! live in the `platforms-client` crate and are injected at wiring time.

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::event::PlayerProfile;
use crate::outcome::ReactionNotification;

/// A chat-platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

/// A social-post-platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialUser {
    pub id: String,
    pub username: String,
}

/// Player-metadata enrichment by player id.
#[async_trait]
pub trait PlayerLookup: Send + Sync {
    async fn player_profile(&self, player_id: &str) -> Result<PlayerProfile, ServiceError>;
}

/// Authenticated chat-platform session.
///
/// One session is shared read-only across all concurrently running
/// pipelines; two pipelines reacting to the same streaming user can race on
/// join/leave. That race is a documented, accepted hazard.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Look up an account by login name.
    async fn user_by_login(&self, login: &str) -> Result<Option<ChatUser>, ServiceError>;

    /// Join a user's channel.
    async fn join(&self, channel: &str) -> Result<(), ServiceError>;

    /// Leave a user's channel.
    async fn leave(&self, channel: &str) -> Result<(), ServiceError>;

    /// Send a chat message to a channel.
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ServiceError>;

    /// Whether the user is currently live.
    async fn is_live(&self, user_id: &str) -> Result<bool, ServiceError>;

    /// Create a clip of the user's live broadcast; returns a shareable URL.
    async fn create_clip(&self, user_id: &str) -> Result<String, ServiceError>;
}

/// Authenticated social-post platform.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Look up an account by handle.
    async fn user_by_handle(&self, handle: &str) -> Result<Option<SocialUser>, ServiceError>;

    /// Follow an account. Best-effort; callers ignore failures.
    async fn follow(&self, user_id: &str) -> Result<(), ServiceError>;

    /// Create a post with a bounded-length plain-text body.
    async fn create_post(&self, text: &str) -> Result<(), ServiceError>;
}

/// Terminal notification fan-out.
///
/// Delivery to each configured endpoint is independent and best-effort;
/// implementations log per-endpoint failures and never propagate them.
#[async_trait]
pub trait ReactionNotifier: Send + Sync {
    async fn notify(&self, notification: &ReactionNotification);
}
