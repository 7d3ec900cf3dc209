//! Feed error types.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors that can occur while setting up a feed subscription.
///
/// Transport-level failures during operation are not surfaced here; the
/// manager retries them internally and none of them are fatal to it.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The configured feed URL does not parse.
    #[error("Invalid feed URL: {0}")]
    Url(#[from] url::ParseError),

    /// The configured feed URL is not a WebSocket URL.
    #[error("Unsupported feed URL scheme: {0}")]
    UnsupportedScheme(String),
}
