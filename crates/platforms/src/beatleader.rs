//! BeatLeader player-metadata client.

use async_trait::async_trait;
use reqwest::{Client, header};

use reactor::{PlayerLookup, PlayerProfile, ServiceError};

/// Public BeatLeader API base.
pub const DEFAULT_BASE_URL: &str = "https://api.beatleader.xyz";

/// Enrichment lookups against the leaderboard's player endpoint.
pub struct BeatLeaderClient {
    client: Client,
    base_url: String,
}

impl BeatLeaderClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API base (used by tests).
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait]
impl PlayerLookup for BeatLeaderClient {
    async fn player_profile(&self, player_id: &str) -> Result<PlayerProfile, ServiceError> {
        let url = format!("{}/player/{}", self.base_url, player_id);
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::status(status.as_u16(), body));
        }

        response
            .json::<PlayerProfile>()
            .await
            .map_err(|e| ServiceError::http(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = BeatLeaderClient::with_base_url(Client::new(), "https://api.example.com/");
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn profile_ignores_unknown_fields() {
        // The player endpoint returns far more than we model.
        let raw = r#"{
            "id": "76561198059961776",
            "name": "NanoPixel",
            "avatar": "https://cdn.example.com/avatar.png",
            "country": "GB",
            "pp": 12345.6,
            "socials": [
                {"service": "Twitch", "link": "https://twitch.tv/nanopixel", "user": "nanopixel"}
            ]
        }"#;
        let profile: PlayerProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.name, "NanoPixel");
        assert_eq!(profile.socials.len(), 1);
    }
}
