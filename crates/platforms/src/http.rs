//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

/// User agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("wysi/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the process-wide HTTP client.
///
/// One client is built at startup and cloned (cheaply, it is a handle) into
/// every platform client so connection pools are shared.
pub fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|error| {
            warn!(error = %error, "failed to build configured HTTP client; falling back to defaults");
            Client::new()
        })
}
