//! Twitch Helix REST client.
//!
//! Authenticates with the refresh-token grant: the access token is obtained
//! at startup and refreshed once, in place, when a call comes back 401.

use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};

use reactor::ServiceError;

/// Helix API base.
pub const DEFAULT_BASE_URL: &str = "https://api.twitch.tv/helix";

/// OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// App credentials plus the user refresh token.
#[derive(Debug, Clone)]
pub struct TwitchCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// A Helix user record.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

/// A Helix stream record; its presence means the broadcaster is live.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixStream {
    pub id: String,
}

/// A freshly created clip.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixClip {
    pub id: String,
}

/// Every Helix response wraps its payload in a `data` array.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Twitch rotates refresh tokens; keep the newest one when present.
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Default)]
struct TokenState {
    access_token: String,
    refresh_token: String,
}

/// Shareable clip URL for a clip id.
pub fn clip_url(clip_id: &str) -> String {
    format!("https://clips.twitch.tv/{clip_id}")
}

pub struct HelixClient {
    http: Client,
    credentials: TwitchCredentials,
    base_url: String,
    token_url: String,
    tokens: RwLock<TokenState>,
}

impl HelixClient {
    pub fn new(http: Client, credentials: TwitchCredentials) -> Self {
        Self::with_urls(http, credentials, DEFAULT_BASE_URL, DEFAULT_TOKEN_URL)
    }

    /// Point the client at different endpoints (used by tests).
    pub fn with_urls(
        http: Client,
        credentials: TwitchCredentials,
        base_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        let refresh_token = credentials.refresh_token.clone();
        Self {
            http,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            tokens: RwLock::new(TokenState {
                access_token: String::new(),
                refresh_token,
            }),
        }
    }

    /// Exchange the refresh token for a fresh access token.
    ///
    /// Called once at startup (which also validates the configured
    /// credentials) and again whenever a call is rejected with 401.
    pub async fn authenticate(&self) -> Result<(), ServiceError> {
        let refresh_token = self.tokens.read().await.refresh_token.clone();

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::auth(format!(
                "token refresh failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))?;

        let mut state = self.tokens.write().await;
        state.access_token = token.access_token;
        if let Some(rotated) = token.refresh_token {
            state.refresh_token = rotated;
        }
        info!("refreshed chat-platform access token");
        Ok(())
    }

    /// Current access token; the chat session authenticates with it too.
    pub async fn access_token(&self) -> String {
        self.tokens.read().await.access_token.clone()
    }

    /// The user the configured token belongs to.
    pub async fn current_user(&self) -> Result<Option<HelixUser>, ServiceError> {
        let users: Vec<HelixUser> = self.request(Method::GET, "/users", &[]).await?;
        Ok(users.into_iter().next())
    }

    pub async fn user_by_login(&self, login: &str) -> Result<Option<HelixUser>, ServiceError> {
        let users: Vec<HelixUser> = self
            .request(Method::GET, "/users", &[("login", login)])
            .await?;
        Ok(users.into_iter().next())
    }

    pub async fn stream_live(&self, user_id: &str) -> Result<bool, ServiceError> {
        let streams: Vec<HelixStream> = self
            .request(Method::GET, "/streams", &[("user_id", user_id)])
            .await?;
        Ok(!streams.is_empty())
    }

    /// Create a clip of the broadcaster's live stream; returns the clip id.
    pub async fn create_clip(&self, broadcaster_id: &str) -> Result<String, ServiceError> {
        let clips: Vec<HelixClip> = self
            .request(Method::POST, "/clips", &[("broadcaster_id", broadcaster_id)])
            .await?;
        clips
            .into_iter()
            .next()
            .map(|clip| clip.id)
            .ok_or_else(|| ServiceError::other("clip creation returned no clip"))
    }

    /// One request, with a single refresh-and-retry on a rejected token.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ServiceError> {
        match self.request_once(method.clone(), path, query).await {
            Err(ServiceError::Auth(reason)) => {
                debug!(reason, "access token rejected; refreshing");
                self.authenticate().await?;
                self.request_once(method, path, query).await
            }
            other => other,
        }
    }

    async fn request_once<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ServiceError> {
        let token = self.tokens.read().await.access_token.clone();
        let response = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .query(query)
            .bearer_auth(&token)
            .header("Client-Id", &self.credentials.client_id)
            .send()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ServiceError::auth("access token rejected"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::status(status.as_u16(), body));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_data() {
        let raw = r#"{"data": [{"id": "141981764", "login": "twitchdev", "display_name": "TwitchDev"}]}"#;
        let envelope: Envelope<HelixUser> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.data[0].login, "twitchdev");
    }

    #[test]
    fn empty_envelope_means_no_results() {
        let envelope: Envelope<HelixStream> = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn token_response_without_rotation() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn clip_urls_use_the_clips_host() {
        assert_eq!(
            clip_url("AwkwardHelplessSalamanderSwiftRage"),
            "https://clips.twitch.tv/AwkwardHelplessSalamanderSwiftRage"
        );
    }
}
