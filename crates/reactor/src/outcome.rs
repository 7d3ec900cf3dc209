//! Explicit pipeline step outcomes.
//!
//! The chat-engagement branch is forgiving: every failure inside it degrades
//! the run instead of aborting it. The outcomes below keep those degraded
//! states distinguishable — "no clip because the user was not live" is a
//! different value than "no clip because creation failed".

use crate::services::ChatUser;

/// Result of the clip-capture attempt inside chat engagement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipOutcome {
    /// A clip was created; carries the shareable clip URL.
    Created(String),
    /// The user was not live, so no clip was attempted.
    NotLive,
    /// Clip creation (or the live-status lookup) failed.
    Failed,
}

impl ClipOutcome {
    /// The clip URL, if one was created.
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Created(url) => Some(url),
            Self::NotLive | Self::Failed => None,
        }
    }
}

/// Why chat engagement was skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The player has no chat-platform link.
    NoChatLink,
    /// The link resolved to no chat-platform user.
    UserNotFound,
    /// Joining the user's channel failed.
    JoinFailed,
}

/// Result of the conditional chat-engagement step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// No chat side effects happened.
    Skipped(SkipReason),
    /// The channel was joined and announced in.
    Engaged { user: ChatUser, clip: ClipOutcome },
}

impl ChatOutcome {
    /// The primary clip URL, if engagement produced one.
    pub fn clip_link(&self) -> Option<&str> {
        match self {
            Self::Engaged { clip, .. } => clip.link(),
            Self::Skipped(_) => None,
        }
    }
}

/// Accumulated result of one pipeline run. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct ReactionOutcome {
    pub display_name: String,
    pub clip_link: Option<String>,
    pub reaction_clip_link: Option<String>,
    pub replay_url: String,
}

/// Everything the webhook notifier needs to render one notification.
#[derive(Debug, Clone)]
pub struct ReactionNotification {
    pub player_name: String,
    /// Human-facing accuracy percentage (trailing zeros trimmed).
    pub accuracy_pct: String,
    pub song_name: String,
    pub song_author: String,
    pub difficulty: String,
    pub replay_url: String,
    pub twitter_link: Option<String>,
    pub twitch_link: Option<String>,
    pub clip_link: Option<String>,
    pub reaction_clip_link: Option<String>,
    pub cover_url: String,
    pub avatar_url: String,
}
