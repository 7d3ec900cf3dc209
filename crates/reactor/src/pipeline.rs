//! The reaction pipeline.
//!
//! One run per inbound message: parse, filter, enrich, engage chat, post,
//! notify. The pipeline is linear with branch points and no backward
//! transitions; once a step's external side effect has executed it is never
//! retracted, even if a later step fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scorefeed::MessageSink;
use tracing::{debug, error, info, warn};

use crate::error::{ReactorError, Result};
use crate::event::{PlayerProfile, ScoreEvent};
use crate::notability::{accuracy_pct, display_pct, is_notable};
use crate::outcome::{ChatOutcome, ClipOutcome, ReactionNotification, ReactionOutcome, SkipReason};
use crate::services::{ChatPlatform, ChatUser, PlayerLookup, ReactionNotifier, SocialPlatform};
use crate::socials::{SocialLinks, username_from_link};

/// Chat announcement suffix when no clip could be captured.
const NO_CLIP_FALLBACK: &str = "(no clip, not live / no perms)";

/// Pipeline timing and URL settings.
#[derive(Debug, Clone)]
pub struct ReactorConfig {
    /// Wait before the primary clip, so enough broadcast buffer exists.
    pub clip_warmup: Duration,
    /// Wait before the optional follow-up clip.
    pub reaction_clip_delay: Duration,
    /// Base URL for replay links; the score id is appended as a query.
    pub replay_url_base: String,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            clip_warmup: Duration::from_secs(20),
            reaction_clip_delay: Duration::from_secs(25),
            replay_url_base: "https://replay.beatleader.xyz/".to_string(),
        }
    }
}

/// Executes the notify-and-post workflow for one raw message at a time.
///
/// External collaborators are injected as trait objects; the shared HTTP
/// and chat sessions live inside those implementations and are borrowed by
/// every concurrently running pipeline.
pub struct Reactor {
    players: Arc<dyn PlayerLookup>,
    chat: Arc<dyn ChatPlatform>,
    social: Arc<dyn SocialPlatform>,
    notifier: Arc<dyn ReactionNotifier>,
    config: ReactorConfig,
}

impl Reactor {
    pub fn new(
        players: Arc<dyn PlayerLookup>,
        chat: Arc<dyn ChatPlatform>,
        social: Arc<dyn SocialPlatform>,
        notifier: Arc<dyn ReactionNotifier>,
        config: ReactorConfig,
    ) -> Self {
        Self {
            players,
            chat,
            social,
            notifier,
            config,
        }
    }

    /// Run the full pipeline for one raw feed message.
    ///
    /// Returns `Ok(None)` for non-notable events. Parse and enrichment
    /// failures abort the run; every other external failure degrades it.
    pub async fn process(&self, raw: &str) -> Result<Option<ReactionOutcome>> {
        let event = ScoreEvent::parse(raw)?;
        let pct = accuracy_pct(event.accuracy);

        if !is_notable(&pct) {
            debug!(
                player = %event.player.name,
                accuracy = %pct,
                song = %event.leaderboard.song.name,
                author = %event.leaderboard.song.author,
                "score is not notable"
            );
            return Ok(None);
        }

        info!(
            player = %event.player.name,
            accuracy = %pct,
            song = %event.leaderboard.song.name,
            "notable score detected"
        );

        self.react(&event, &pct).await.map(Some)
    }

    async fn react(&self, event: &ScoreEvent, pct: &str) -> Result<ReactionOutcome> {
        // Enrich. The only external call whose failure aborts the run:
        // without authoritative socials nothing downstream makes sense.
        let profile = self
            .players
            .player_profile(&event.player.id)
            .await
            .map_err(ReactorError::Enrichment)?;

        let links = SocialLinks::from_entries(&profile.socials);
        let replay_url = format!("{}?scoreId={}", self.config.replay_url_base, event.id);
        let shown_pct = display_pct(pct);

        let chat = self
            .engage_chat(event, shown_pct, links.twitch.as_deref())
            .await;
        let clip_link = chat.clip_link().map(str::to_string);

        let display_name = self
            .resolve_display_name(&profile, links.twitter.as_deref())
            .await;

        self.post_update(
            event,
            shown_pct,
            &display_name,
            &replay_url,
            clip_link.as_deref(),
            links.twitch.as_deref(),
        )
        .await;

        // The first clip worked, so a second one likely will too.
        let reaction_clip_link = match &chat {
            ChatOutcome::Engaged {
                user,
                clip: ClipOutcome::Created(_),
            } => self.reaction_clip(user).await,
            _ => None,
        };

        let notification = ReactionNotification {
            player_name: profile.name.clone(),
            accuracy_pct: shown_pct.to_string(),
            song_name: event.leaderboard.song.name.clone(),
            song_author: event.leaderboard.song.author.clone(),
            difficulty: event.leaderboard.difficulty.difficulty_name.clone(),
            replay_url: replay_url.clone(),
            twitter_link: links.twitter.clone(),
            twitch_link: links.twitch.clone(),
            clip_link: clip_link.clone(),
            reaction_clip_link: reaction_clip_link.clone(),
            cover_url: event.leaderboard.song.cover_image.clone(),
            avatar_url: profile.avatar.clone(),
        };
        self.notifier.notify(&notification).await;

        Ok(ReactionOutcome {
            display_name,
            clip_link,
            reaction_clip_link,
            replay_url,
        })
    }

    /// Conditional chat engagement: join, clip, announce, leave.
    ///
    /// Every failure in here degrades the outcome instead of aborting the
    /// pipeline.
    async fn engage_chat(
        &self,
        event: &ScoreEvent,
        pct: &str,
        twitch_link: Option<&str>,
    ) -> ChatOutcome {
        let Some(login) = twitch_link.and_then(username_from_link) else {
            return ChatOutcome::Skipped(SkipReason::NoChatLink);
        };

        let user = match self.chat.user_by_login(login).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(login, "no chat user behind the linked channel");
                return ChatOutcome::Skipped(SkipReason::UserNotFound);
            }
            Err(e) => {
                warn!(login, error = %e, "chat user lookup failed");
                return ChatOutcome::Skipped(SkipReason::UserNotFound);
            }
        };

        if let Err(e) = self.chat.join(&user.login).await {
            warn!(channel = %user.login, error = %e, "failed to join chat channel");
            return ChatOutcome::Skipped(SkipReason::JoinFailed);
        }

        let clip = self.capture_clip(&user).await;

        let song = &event.leaderboard.song;
        let text = format!(
            "! WYSI @{} just got a {pct}% on {} by {} | {}",
            user.login,
            song.name,
            song.author,
            clip.link().unwrap_or(NO_CLIP_FALLBACK),
        );
        if let Err(e) = self.chat.send_message(&user.login, &text).await {
            warn!(channel = %user.login, error = %e, "chat announcement failed");
        }

        if let Err(e) = self.chat.leave(&user.login).await {
            warn!(channel = %user.login, error = %e, "failed to leave chat channel");
        }

        ChatOutcome::Engaged { user, clip }
    }

    /// Capture the primary clip if the user is live.
    async fn capture_clip(&self, user: &ChatUser) -> ClipOutcome {
        match self.chat.is_live(&user.id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(login = %user.login, "user is not live, skipping clip");
                return ClipOutcome::NotLive;
            }
            Err(e) => {
                warn!(login = %user.login, error = %e, "live-status lookup failed");
                return ClipOutcome::Failed;
            }
        }

        tokio::time::sleep(self.config.clip_warmup).await;

        match self.chat.create_clip(&user.id).await {
            Ok(url) => ClipOutcome::Created(url),
            Err(e) => {
                warn!(login = %user.login, error = %e, "clip creation failed");
                ClipOutcome::Failed
            }
        }
    }

    /// Resolve the display name for the social post: `@handle` when the
    /// linked account resolves, the raw player name otherwise.
    async fn resolve_display_name(
        &self,
        profile: &PlayerProfile,
        twitter_link: Option<&str>,
    ) -> String {
        let Some(handle) = twitter_link.and_then(username_from_link) else {
            return profile.name.clone();
        };

        match self.social.user_by_handle(handle).await {
            Ok(Some(user)) => {
                // Best-effort; the post goes out either way.
                if let Err(e) = self.social.follow(&user.id).await {
                    debug!(username = %user.username, error = %e, "follow failed");
                }
                format!("@{}", user.username)
            }
            Ok(None) => {
                debug!(handle, "no social account behind the linked handle");
                profile.name.clone()
            }
            Err(e) => {
                warn!(handle, error = %e, "social account lookup failed");
                profile.name.clone()
            }
        }
    }

    async fn post_update(
        &self,
        event: &ScoreEvent,
        pct: &str,
        display_name: &str,
        replay_url: &str,
        clip_link: Option<&str>,
        twitch_link: Option<&str>,
    ) {
        let song = &event.leaderboard.song;
        let trailer = clip_link.or(twitch_link).unwrap_or("");
        let text = format!(
            "{display_name} just got a {pct}% on {} ({}) by {}! {replay_url} {trailer}",
            song.name, event.leaderboard.difficulty.difficulty_name, song.author,
        );
        let text = text.trim_end();

        match self.social.create_post(text).await {
            Ok(()) => info!(text, "posted social update"),
            Err(e) => warn!(error = %e, "social post failed"),
        }
    }

    /// Optional follow-up clip, taken a while after the first one.
    async fn reaction_clip(&self, user: &ChatUser) -> Option<String> {
        tokio::time::sleep(self.config.reaction_clip_delay).await;

        match self.chat.create_clip(&user.id).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(login = %user.login, error = %e, "reaction clip creation failed");
                None
            }
        }
    }
}

/// Fire-and-forget bridge between the feed manager and the reactor.
///
/// Each inbound message spawns an independent, non-awaited pipeline run, so
/// a slow or stuck pipeline can never stall ingestion or starve the
/// upstream connection into an inactivity drop. No concurrency cap is
/// imposed; a burst of notable events launches that many concurrent runs.
pub struct ReactionSink {
    reactor: Arc<Reactor>,
}

impl ReactionSink {
    pub fn new(reactor: Arc<Reactor>) -> Self {
        Self { reactor }
    }
}

#[async_trait]
impl MessageSink for ReactionSink {
    async fn on_open(&self) {
        info!("score feed subscription open");
    }

    async fn on_message(&self, raw: &str) {
        let reactor = self.reactor.clone();
        let raw = raw.to_string();
        tokio::spawn(async move {
            match reactor.process(&raw).await {
                Ok(_) => {}
                Err(ReactorError::Parse(e)) => {
                    warn!(error = %e, "dropping malformed feed message");
                }
                Err(e) => {
                    error!(error = %e, "reaction pipeline failed");
                }
            }
        });
    }

    async fn on_close(&self, reason: &str) {
        info!(reason, "score feed subscription closed");
    }
}
