//! Twitch integration: Helix REST plus the IRC chat session.

mod chat;
mod helix;

pub use chat::{ChatSession, DEFAULT_CHAT_URL};
pub use helix::{HelixClient, HelixUser, TwitchCredentials, clip_url};

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use reactor::{ChatPlatform, ChatUser, ServiceError};

/// The chat-platform seam: Helix for lookups/streams/clips, IRC for the
/// channel operations.
pub struct TwitchService {
    helix: HelixClient,
    chat: ChatSession,
}

impl TwitchService {
    /// Authenticate against Helix and open the chat session as the user the
    /// configured refresh token belongs to.
    ///
    /// Fails fast on bad credentials, which the caller treats as fatal.
    pub async fn connect(http: Client, credentials: TwitchCredentials) -> Result<Self, ServiceError> {
        let helix = HelixClient::new(http, credentials);
        helix.authenticate().await?;

        let bot = helix
            .current_user()
            .await?
            .ok_or_else(|| ServiceError::auth("access token resolves to no user"))?;
        let token = helix.access_token().await;
        let chat = ChatSession::connect(&bot.login, &token).await?;
        info!(login = %bot.login, "chat session open");

        Ok(Self { helix, chat })
    }

    /// Assemble from already-connected parts (used by tests).
    pub fn from_parts(helix: HelixClient, chat: ChatSession) -> Self {
        Self { helix, chat }
    }
}

#[async_trait]
impl ChatPlatform for TwitchService {
    async fn user_by_login(&self, login: &str) -> Result<Option<ChatUser>, ServiceError> {
        Ok(self.helix.user_by_login(login).await?.map(|user| ChatUser {
            id: user.id,
            login: user.login,
            display_name: user.display_name,
        }))
    }

    async fn join(&self, channel: &str) -> Result<(), ServiceError> {
        self.chat.join(channel).await
    }

    async fn leave(&self, channel: &str) -> Result<(), ServiceError> {
        self.chat.part(channel).await
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ServiceError> {
        self.chat.privmsg(channel, text).await
    }

    async fn is_live(&self, user_id: &str) -> Result<bool, ServiceError> {
        self.helix.stream_live(user_id).await
    }

    async fn create_clip(&self, user_id: &str) -> Result<String, ServiceError> {
        let clip_id = self.helix.create_clip(user_id).await?;
        Ok(clip_url(&clip_id))
    }
}
