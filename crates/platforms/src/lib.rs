//! Platform clients behind the reactor's service seams.
//!
//! Every client borrows the one shared `reqwest::Client` built at startup;
//! the chat session is likewise opened once and shared by reference across
//! all concurrently running pipelines.
//!
//! - [`BeatLeaderClient`] - player-metadata enrichment ([`reactor::PlayerLookup`])
//! - [`TwitchService`] - Helix REST plus IRC-over-WebSocket chat
//!   ([`reactor::ChatPlatform`])
//! - [`TwitterClient`] - v2 API with OAuth 1.0a user context
//!   ([`reactor::SocialPlatform`])
//! - [`WebhookNotifier`] - independent best-effort webhook fan-out
//!   ([`reactor::ReactionNotifier`])

pub mod beatleader;
pub mod discord;
pub mod http;
pub mod twitch;
pub mod twitter;

pub use beatleader::BeatLeaderClient;
pub use discord::WebhookNotifier;
pub use twitch::{TwitchCredentials, TwitchService};
pub use twitter::{TwitterClient, TwitterCredentials};
