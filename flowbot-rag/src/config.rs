//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Number of candidates fetched from the vector index.
pub const DEFAULT_TOP_K: usize = 9;

/// Number of candidates kept after reranking.
pub const DEFAULT_TOP_N: usize = 4;

/// Maximum characters of a match body rendered into the context.
pub const DEFAULT_BODY_CHAR_BUDGET: usize = 500;

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Vector index namespace searched by the pipeline.
    pub namespace: String,
    /// Number of nearest neighbors fetched from the vector index.
    pub top_k: usize,
    /// Number of results kept after reranking.
    pub top_n: usize,
    /// Maximum characters of each match body included in the formatted context.
    pub body_char_budget: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            top_k: DEFAULT_TOP_K,
            top_n: DEFAULT_TOP_N,
            body_char_budget: DEFAULT_BODY_CHAR_BUDGET,
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Check the `top_k >= top_n > 0` relation.
pub(crate) fn validate_limits(top_k: usize, top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(RagError::ConfigError("top_n must be greater than zero".to_string()));
    }
    if top_k < top_n {
        return Err(RagError::ConfigError(format!(
            "top_k ({top_k}) must be greater than or equal to top_n ({top_n})"
        )));
    }
    Ok(())
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the vector index namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the number of candidates fetched from the vector index.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the number of results kept after reranking.
    pub fn top_n(mut self, n: usize) -> Self {
        self.config.top_n = n;
        self
    }

    /// Set the per-match body character budget.
    pub fn body_char_budget(mut self, budget: usize) -> Self {
        self.config.body_char_budget = budget;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `top_n == 0`
    /// - `top_k < top_n`
    /// - `body_char_budget == 0`
    /// - `namespace` is empty
    pub fn build(self) -> Result<RetrievalConfig> {
        validate_limits(self.config.top_k, self.config.top_n)?;
        if self.config.body_char_budget == 0 {
            return Err(RagError::ConfigError(
                "body_char_budget must be greater than zero".to_string(),
            ));
        }
        if self.config.namespace.trim().is_empty() {
            return Err(RagError::ConfigError("namespace must not be empty".to_string()));
        }
        Ok(self.config)
    }
}
