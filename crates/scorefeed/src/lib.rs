//! Scorefeed: persistent subscription to a live score-submission feed.
//!
//! This crate keeps one logical WebSocket connection to a score feed alive
//! indefinitely. Transport failures of any class (refused, timeout, abnormal
//! close, protocol error) are retried with capped exponential backoff; a
//! successful connection resets the backoff to its base value.
//!
//! ## Core Types
//!
//! - [`FeedManager`] - Owns the connection state machine and the retry loop
//! - [`FeedConfig`] - Feed URL and backoff bounds
//! - [`MessageSink`] - Capability implemented by the consumer of feed messages
//! - [`Backoff`] - Capped exponential reconnect delay
//!
//! Messages are delivered to the single registered sink in arrival order.
//! The sink must return promptly; dispatching per-message work is the sink's
//! responsibility, so a slow consumer can never stall ingestion or cause the
//! upstream connection to be dropped for inactivity.

pub mod backoff;
pub mod error;
pub mod manager;
pub mod sink;

pub use backoff::Backoff;
pub use error::{FeedError, Result};
pub use manager::{FeedConfig, FeedManager};
pub use sink::MessageSink;
