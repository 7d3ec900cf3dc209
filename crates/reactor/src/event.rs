//! Score-feed and enrichment documents.

use serde::Deserialize;

/// One score-submission event as received from the feed.
///
/// Created on message parse, consumed within one pipeline run. Missing
/// required fields fail deserialization and the message is discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreEvent {
    /// Score id; used to build the replay URL.
    pub id: u64,
    /// Accuracy in `0.0..=1.0`.
    pub accuracy: f64,
    pub player: Player,
    pub leaderboard: Leaderboard,
}

impl ScoreEvent {
    /// Parse one raw feed message.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Player data embedded in a score event.
#[derive(Debug, Clone, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(default)]
    pub socials: Vec<SocialEntry>,
}

/// A linked external account: `{service, link}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialEntry {
    pub service: String,
    pub link: String,
}

impl SocialEntry {
    /// Convenience constructor, mostly for tests.
    pub fn new(service: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            link: link.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Leaderboard {
    pub song: Song,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Song {
    pub name: String,
    pub author: String,
    #[serde(rename = "coverImage")]
    pub cover_image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Difficulty {
    #[serde(rename = "difficultyName")]
    pub difficulty_name: String,
}

/// Enrichment result for a player id: a superset of the event's player
/// fields with the authoritative socials list.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(default)]
    pub socials: Vec<SocialEntry>,
}
