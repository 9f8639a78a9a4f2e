//! Retrieval pipeline orchestrator.
//!
//! The [`RetrievalPipeline`] composes an [`EmbeddingProvider`], a
//! [`VectorStore`] and a [`Reranker`] into one operation:
//! embed → top-k search → rerank to top-n → format.
//!
//! The pipeline never fails towards its caller. Every call ends in a
//! [`RetrievalOutcome`], and backend errors become [`RetrievalOutcome::Degraded`]
//! carrying a readable message, so a chat conversation keeps going when a
//! backend hiccups.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowbot_rag::{RetrievalConfig, RetrievalPipeline, InMemoryVectorStore, NoOpReranker};
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RetrievalConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .reranker(Arc::new(NoOpReranker))
//!     .build()?;
//!
//! let context = pipeline.search("refund policy", 9, 4).await.into_text();
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{RetrievalConfig, validate_limits};
use crate::document::{RerankedMatch, sort_by_rerank_score};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::format::FormattedContext;
use crate::reranker::Reranker;
use crate::vectorstore::VectorStore;

/// Text handed to the model when nothing relevant was found.
pub const NO_RESULTS_MESSAGE: &str = "No relevant information found in the knowledge base.";

/// Prefix of the text handed to the model when retrieval failed.
pub const SEARCH_ERROR_PREFIX: &str = "Error performing search:";

/// Result of one retrieval.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// At least one match survived reranking.
    Context(FormattedContext),
    /// The index returned no usable matches.
    Empty,
    /// A backend failed; the message describes the failure.
    Degraded(String),
}

impl RetrievalOutcome {
    /// Whether this outcome came from a backend failure.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Plain text for the tool result, whatever the variant.
    pub fn into_text(self) -> String {
        match self {
            Self::Context(context) => context.to_string(),
            Self::Empty => NO_RESULTS_MESSAGE.to_string(),
            Self::Degraded(message) => message,
        }
    }
}

impl fmt::Display for RetrievalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(context) => context.fmt(f),
            Self::Empty => f.write_str(NO_RESULTS_MESSAGE),
            Self::Degraded(message) => f.write_str(message),
        }
    }
}

/// The retrieval pipeline.
///
/// Construct one via [`RetrievalPipeline::builder()`]. The pipeline holds no
/// per-request state and can be shared behind an `Arc`.
pub struct RetrievalPipeline {
    config: RetrievalConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    reranker: Arc<dyn Reranker>,
}

impl RetrievalPipeline {
    /// Create a new [`RetrievalPipelineBuilder`].
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Search with the configured `top_k` and `top_n`.
    pub async fn search_default(&self, query: &str) -> RetrievalOutcome {
        self.search(query, self.config.top_k, self.config.top_n).await
    }

    /// Run embed → search → rerank → format for `query`.
    ///
    /// Requires `top_k >= top_n > 0`; other values produce
    /// [`RetrievalOutcome::Degraded`].
    pub async fn search(&self, query: &str, top_k: usize, top_n: usize) -> RetrievalOutcome {
        match self.try_search(query, top_k, top_n).await {
            Ok(Some(context)) => {
                info!(query, result_count = context.len(), "retrieval completed");
                RetrievalOutcome::Context(context)
            }
            Ok(None) => {
                info!(query, "retrieval found no matches");
                RetrievalOutcome::Empty
            }
            Err(e) => {
                error!(query, error = %e, "retrieval failed");
                RetrievalOutcome::Degraded(format!("{SEARCH_ERROR_PREFIX} {e}"))
            }
        }
    }

    async fn try_search(
        &self,
        query: &str,
        top_k: usize,
        top_n: usize,
    ) -> Result<Option<FormattedContext>> {
        validate_limits(top_k, top_n)?;
        let namespace = self.config.namespace.as_str();

        // 1. Embed the query
        let query_embedding = self.embedding_provider.embed(query).await?;

        // 2. Fetch the broad candidate set
        let matches = self.vector_store.query(namespace, &query_embedding, top_k).await?;
        debug!(namespace, top_k, match_count = matches.len(), "vector search returned");
        if matches.is_empty() {
            return Ok(None);
        }

        // 3. Rerank candidates that have text; `positions[i]` is the vector rank
        //    of the i-th document sent
        let (positions, documents): (Vec<usize>, Vec<String>) = matches
            .iter()
            .enumerate()
            .filter_map(|(rank, m)| {
                let text = m.rerank_text();
                if text.is_empty() {
                    debug!(id = %m.id, "skipping match without text");
                    None
                } else {
                    Some((rank, text.to_string()))
                }
            })
            .unzip();
        if documents.is_empty() {
            return Ok(None);
        }
        let hits = self.reranker.rerank(query, &documents, top_n).await?;

        // 4. Map hits back to their original matches
        let mut seen = HashSet::new();
        let mut reranked = Vec::with_capacity(hits.len().min(top_n));
        for hit in hits {
            let Some(&rank) = positions.get(hit.index) else {
                warn!(index = hit.index, candidates = documents.len(), "rerank index out of range");
                continue;
            };
            if !seen.insert(hit.index) {
                warn!(index = hit.index, "duplicate rerank index");
                continue;
            }
            reranked.push(RerankedMatch {
                original_match: matches[rank].clone(),
                vector_rank: rank,
                rerank_score: hit.score,
            });
        }
        sort_by_rerank_score(&mut reranked);
        reranked.truncate(top_n);

        if reranked.is_empty() {
            return Ok(None);
        }

        // 5. Format
        Ok(Some(FormattedContext::render(&reranked, self.config.body_char_budget)))
    }
}

/// Builder for constructing a [`RetrievalPipeline`].
///
/// All fields except `config` are required; `config` defaults to
/// [`RetrievalConfig::default()`].
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RetrievalPipeline::builder()
///     .embedding_provider(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .reranker(Arc::new(reranker))
///     .build()?;
/// ```
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RetrievalConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`RetrievalPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing or
    /// the configuration limits are inconsistent.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config = self.config.unwrap_or_default();
        validate_limits(config.top_k, config.top_n)?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let reranker = self
            .reranker
            .ok_or_else(|| RagError::ConfigError("reranker is required".to_string()))?;

        Ok(RetrievalPipeline { config, embedding_provider, vector_store, reranker })
    }
}
