mod cli;
mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use platforms_client::{
    BeatLeaderClient, TwitchCredentials, TwitchService, TwitterClient, TwitterCredentials,
    WebhookNotifier, http,
};
use reactor::{ReactionSink, Reactor, ReactorConfig};
use scorefeed::{FeedConfig, FeedManager};

use crate::cli::Args;
use crate::config::AppConfig;

/// Default log filter directive.
const DEFAULT_LOG_FILTER: &str = "wysi=info,scorefeed=info,reactor=info,platforms_client=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = AppConfig::load(&args.config)?;
    let http = http::build_client();

    // Bad credentials surface here, before the feed is ever opened.
    let twitch = TwitchService::connect(
        http.clone(),
        TwitchCredentials {
            client_id: config.twitch.client_id.clone(),
            client_secret: config.twitch.client_secret.clone(),
            refresh_token: config.twitch.refresh_token.clone(),
        },
    )
    .await
    .context("chat platform startup failed")?;

    let twitter = TwitterClient::new(
        http.clone(),
        TwitterCredentials {
            app_key: config.twitter.app_key.clone(),
            app_secret: config.twitter.app_secret.clone(),
            access_token: config.twitter.access_token.clone(),
            access_secret: config.twitter.access_secret.clone(),
            bearer_token: config.twitter.bearer_token.clone(),
        },
    );
    let players = BeatLeaderClient::new(http.clone());
    let notifier = WebhookNotifier::new(http.clone(), config.discord.webhook_urls());
    info!(
        webhooks = notifier.endpoints().len(),
        "reaction targets configured"
    );

    let reactor = Arc::new(Reactor::new(
        Arc::new(players),
        Arc::new(twitch),
        Arc::new(twitter),
        Arc::new(notifier),
        ReactorConfig::default(),
    ));
    let sink = Arc::new(ReactionSink::new(reactor));

    let manager = Arc::new(
        FeedManager::new(
            FeedConfig {
                url: config.feed.url.clone(),
                base_delay: Duration::from_secs(config.feed.base_delay_secs),
                max_delay: Duration::from_secs(config.feed.max_delay_secs),
            },
            sink,
        )
        .context("invalid feed configuration")?,
    );

    let run = tokio::spawn({
        let manager = manager.clone();
        async move { manager.run().await }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for the shutdown signal")?;
    info!("shutdown requested");
    manager.shutdown();

    // Already-dispatched pipeline runs are not awaited; drain is best-effort.
    if let Err(e) = run.await {
        error!(error = %e, "feed task ended abnormally");
    }
    Ok(())
}

fn init_logging(args: &Args) {
    let default_filter = if args.verbose {
        "wysi=debug,scorefeed=debug,reactor=debug,platforms_client=debug"
    } else if args.quiet {
        "warn"
    } else {
        DEFAULT_LOG_FILTER
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
