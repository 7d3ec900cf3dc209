//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "wysi",
    version,
    about = "Watches a score feed and reacts to notable scores across chat, social and webhooks"
)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml", env = "WYSI_CONFIG")]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}
