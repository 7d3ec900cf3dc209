//! Reactor error types.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, ReactorError>;

/// Errors that abort a single pipeline run.
///
/// Only two steps can abort a run: parsing the inbound document and the
/// enrichment lookup. Every other external failure is caught at its step
/// and degrades the remaining pipeline instead.
#[derive(Error, Debug)]
pub enum ReactorError {
    /// Malformed inbound document; the message is dropped.
    #[error("Malformed score event: {0}")]
    Parse(#[from] serde_json::Error),

    /// Player metadata lookup failed; this run is abandoned.
    #[error("Player enrichment failed: {0}")]
    Enrichment(#[source] ServiceError),
}

/// Errors surfaced by the external service seams.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Unexpected response status.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Credential or token problem.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Chat session failure (socket gone, write failed).
    #[error("Chat error: {0}")]
    Chat(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Create a transport error.
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a chat session error.
    pub fn chat(msg: impl Into<String>) -> Self {
        Self::Chat(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
