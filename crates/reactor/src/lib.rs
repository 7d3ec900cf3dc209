//! Reactor: the per-event reaction pipeline.
//!
//! Consumes raw score-feed messages and, for notable ones, runs a linear
//! branch-and-delay workflow across external services: player enrichment,
//! conditional chat engagement (with clip capture), a social post, an
//! optional follow-up clip, and webhook notification.
//!
//! Side effects are never retracted: once a step has executed, later
//! failures degrade the remaining steps instead of rolling anything back.
//!
//! ## Core Types
//!
//! - [`ScoreEvent`] / [`PlayerProfile`] - Feed and enrichment documents
//! - [`SocialLinks`] - Named link slots extracted from a player's socials
//! - [`Reactor`] - The pipeline itself, generic over the service seams
//! - [`ReactionSink`] - Fire-and-forget bridge from the feed manager
//! - [`ChatOutcome`] / [`ClipOutcome`] - Explicit step outcomes
//!
//! ## Service seams
//!
//! External collaborators are injected as trait objects:
//! [`PlayerLookup`], [`ChatPlatform`], [`SocialPlatform`],
//! [`ReactionNotifier`].

pub mod error;
pub mod event;
pub mod notability;
pub mod outcome;
pub mod pipeline;
pub mod services;
pub mod socials;

pub use error::{ReactorError, Result, ServiceError};
pub use event::{PlayerProfile, ScoreEvent};
pub use notability::{accuracy_pct, display_pct, is_notable};
pub use outcome::{ChatOutcome, ClipOutcome, ReactionNotification, ReactionOutcome, SkipReason};
pub use pipeline::{ReactionSink, Reactor, ReactorConfig};
pub use services::{ChatPlatform, ChatUser, PlayerLookup, ReactionNotifier, SocialPlatform, SocialUser};
pub use socials::{SocialLinks, username_from_link};
