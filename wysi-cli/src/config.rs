//! Configuration loading and bootstrap.
//!
//! A missing config file is bootstrapped with an empty template so the
//! operator has something to fill in; missing or blank credentials are a
//! fatal startup condition.

use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedSection,
    pub twitter: TwitterSection,
    pub twitch: TwitchSection,
    pub discord: DiscordSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// WebSocket URL of the score feed.
    pub url: String,
    /// Initial reconnect delay in seconds.
    pub base_delay_secs: u64,
    /// Reconnect delay cap in seconds.
    pub max_delay_secs: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            url: "wss://api.beatleader.xyz/scores".to_string(),
            base_delay_secs: 1,
            max_delay_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterSection {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    pub access_secret: String,
    pub bearer_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitchSection {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSection {
    /// Comma-separated webhook URLs.
    pub webhooks: String,
}

impl DiscordSection {
    pub fn webhook_urls(&self) -> Vec<String> {
        self.webhooks
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl AppConfig {
    /// Load and validate the configuration at `path`.
    ///
    /// A missing file is written out as an empty template and reported as an
    /// error, so the process exits with instructions instead of running
    /// half-configured.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            Self::default().write_template(path)?;
            bail!(
                "no configuration found at {}; wrote an empty template, fill in the credentials and restart",
                path.display()
            );
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn write_template(&self, path: &Path) -> anyhow::Result<()> {
        let rendered = toml::to_string_pretty(self).context("failed to render config template")?;
        std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Reject blank credentials before any service is touched.
    pub fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("twitter.app_key", &self.twitter.app_key),
            ("twitter.app_secret", &self.twitter.app_secret),
            ("twitter.access_token", &self.twitter.access_token),
            ("twitter.access_secret", &self.twitter.access_secret),
            ("twitter.bearer_token", &self.twitter.bearer_token),
            ("twitch.client_id", &self.twitch.client_id),
            ("twitch.client_secret", &self.twitch.client_secret),
            ("twitch.refresh_token", &self.twitch.refresh_token),
            ("feed.url", &self.feed.url),
        ];

        let mut missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if self.discord.webhook_urls().is_empty() {
            missing.push("discord.webhooks");
        }

        if !missing.is_empty() {
            bail!("missing configuration values: {}", missing.join(", "));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> AppConfig {
        toml::from_str(
            r#"
            [twitter]
            app_key = "k"
            app_secret = "s"
            access_token = "42-t"
            access_secret = "ts"
            bearer_token = "b"

            [twitch]
            client_id = "id"
            client_secret = "secret"
            refresh_token = "refresh"

            [discord]
            webhooks = "https://discord.com/api/webhooks/1/a, https://discord.com/api/webhooks/2/b"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_cover_the_feed_section() {
        let config = filled();
        assert_eq!(config.feed.url, "wss://api.beatleader.xyz/scores");
        assert_eq!(config.feed.base_delay_secs, 1);
        assert_eq!(config.feed.max_delay_secs, 60);
        config.validate().unwrap();
    }

    #[test]
    fn webhook_list_is_split_and_trimmed() {
        let config = filled();
        assert_eq!(
            config.discord.webhook_urls(),
            vec![
                "https://discord.com/api/webhooks/1/a".to_string(),
                "https://discord.com/api/webhooks/2/b".to_string(),
            ]
        );
    }

    #[test]
    fn blank_credentials_fail_validation() {
        let mut config = filled();
        config.twitch.refresh_token = "   ".to_string();
        let error = config.validate().unwrap_err().to_string();
        assert!(error.contains("twitch.refresh_token"));
    }

    #[test]
    fn empty_template_fails_validation() {
        let error = AppConfig::default().validate().unwrap_err().to_string();
        assert!(error.contains("twitter.app_key"));
        assert!(error.contains("discord.webhooks"));
    }

    #[test]
    fn missing_file_bootstraps_a_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let error = AppConfig::load(&path).unwrap_err().to_string();
        assert!(error.contains("wrote an empty template"));
        assert!(path.exists());

        // The template parses back but still fails validation.
        let raw = std::fs::read_to_string(&path).unwrap();
        let template: AppConfig = toml::from_str(&raw).unwrap();
        assert!(template.validate().is_err());
    }
}
