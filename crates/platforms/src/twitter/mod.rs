//! Twitter/X v2 client.
//!
//! Reads (user lookup) use the app bearer token; writes (posts, follows)
//! are signed with the OAuth 1.0a user context.

mod oauth;

pub use oauth::OAuth1Credentials;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::json;

use reactor::{ServiceError, SocialPlatform, SocialUser};

/// v2 API base.
pub const DEFAULT_BASE_URL: &str = "https://api.x.com/2";

/// Full credential set for the posting account.
#[derive(Debug, Clone)]
pub struct TwitterCredentials {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    pub access_secret: String,
    pub bearer_token: String,
}

pub struct TwitterClient {
    http: Client,
    credentials: TwitterCredentials,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    /// Absent when the handle does not resolve; the API reports that as a
    /// 200 with an `errors` array instead of a 404.
    #[serde(default)]
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: String,
}

impl TwitterClient {
    pub fn new(http: Client, credentials: TwitterCredentials) -> Self {
        Self::with_base_url(http, credentials, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API base (used by tests).
    pub fn with_base_url(
        http: Client,
        credentials: TwitterCredentials,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn oauth1(&self) -> OAuth1Credentials {
        OAuth1Credentials {
            consumer_key: self.credentials.app_key.clone(),
            consumer_secret: self.credentials.app_secret.clone(),
            access_token: self.credentials.access_token.clone(),
            access_token_secret: self.credentials.access_secret.clone(),
        }
    }

    /// The authenticated user's id, carried in the access token's
    /// `id-secret` prefix.
    fn own_user_id(&self) -> Option<&str> {
        self.credentials
            .access_token
            .split('-')
            .next()
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
    }

    async fn signed_post(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ServiceError> {
        let authorization = oauth::authorization_header(
            "POST",
            url,
            &self.oauth1(),
            &oauth::nonce(),
            Utc::now().timestamp(),
        )?;
        self.http
            .post(url)
            .header(header::AUTHORIZATION, authorization)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))
    }
}

async fn check_ok(response: reqwest::Response) -> Result<(), ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status.as_u16() == 401 {
        return Err(ServiceError::auth("request signature rejected"));
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::status(status.as_u16(), body))
}

#[async_trait]
impl SocialPlatform for TwitterClient {
    async fn user_by_handle(&self, handle: &str) -> Result<Option<SocialUser>, ServiceError> {
        let url = format!("{}/users/by/username/{}", self.base_url, handle);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.bearer_token)
            .send()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if status.as_u16() == 401 {
            return Err(ServiceError::auth("bearer token rejected"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::status(status.as_u16(), body));
        }

        let envelope: UserEnvelope = response
            .json()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))?;
        Ok(envelope.data.map(|user| SocialUser {
            id: user.id,
            username: user.username,
        }))
    }

    async fn follow(&self, user_id: &str) -> Result<(), ServiceError> {
        let source = self
            .own_user_id()
            .ok_or_else(|| ServiceError::auth("access token carries no user id"))?
            .to_string();
        let url = format!("{}/users/{}/following", self.base_url, source);
        let response = self
            .signed_post(&url, json!({ "target_user_id": user_id }))
            .await?;
        check_ok(response).await
    }

    async fn create_post(&self, text: &str) -> Result<(), ServiceError> {
        let url = format!("{}/tweets", self.base_url);
        let response = self.signed_post(&url, json!({ "text": text })).await?;
        check_ok(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(access_token: &str) -> TwitterClient {
        TwitterClient::new(
            Client::new(),
            TwitterCredentials {
                app_key: "ck".to_string(),
                app_secret: "cs".to_string(),
                access_token: access_token.to_string(),
                access_secret: "ts".to_string(),
                bearer_token: "bearer".to_string(),
            },
        )
    }

    #[test]
    fn own_user_id_comes_from_the_token_prefix() {
        assert_eq!(client("12345-s3cr3t").own_user_id(), Some("12345"));
        assert_eq!(client("s3cr3t").own_user_id(), None);
        assert_eq!(client("-s3cr3t").own_user_id(), None);
    }

    #[test]
    fn missing_user_deserializes_to_none() {
        let raw = r#"{"errors": [{"title": "Not Found Error"}]}"#;
        let envelope: UserEnvelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn user_envelope_carries_id_and_username() {
        let raw = r#"{"data": {"id": "42", "username": "foo", "name": "Foo"}}"#;
        let envelope: UserEnvelope = serde_json::from_str(raw).unwrap();
        let user = envelope.data.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.username, "foo");
    }
}
