//! Error types for the `flowbot-model` crate.

use thiserror::Error;

/// Errors that can occur while talking to a chat-completion service.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The client was configured with invalid values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request could not be sent or the connection broke.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail reported by the service.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The event stream failed after it was opened.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
