//! Error types for the `flowbot-chat` crate.

use thiserror::Error;

/// Errors raised while setting up a chat orchestrator.
///
/// Running a conversation never fails; failures there are reported to the
/// user as text.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for chat setup.
pub type Result<T> = std::result::Result<T, ChatError>;
