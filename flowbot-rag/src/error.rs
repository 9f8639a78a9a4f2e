//! Error types for the `flowbot-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during result reranking.
    #[error("Reranker error ({reranker}): {message}")]
    RerankerError {
        /// The reranker that produced the error.
        reranker: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the retrieval pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// The model supplied unusable arguments for a retrieval tool call.
    #[error(transparent)]
    ToolArgument(#[from] ToolArgumentError),
}

/// Why a `retrieve_knowledge` argument payload was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolArgumentError {
    /// The payload was not a JSON object matching the schema.
    #[error("malformed arguments: {0}")]
    Malformed(String),

    /// The `query` field was missing or not a string.
    #[error("missing required 'query' parameter")]
    MissingQuery,

    /// The `query` field was present but blank.
    #[error("'query' must not be empty")]
    EmptyQuery,
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
