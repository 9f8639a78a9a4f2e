//! Reranker trait for re-scoring vector search candidates.

use async_trait::async_trait;

use crate::document::RerankHit;
use crate::error::Result;

/// A reranker that scores candidate texts against a query.
///
/// Implementations typically call a cross-encoder service. The returned hits
/// reference candidates by their position in `documents`, ordered from most
/// to least relevant, and contain at most `top_n` entries.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank `documents` for `query`, keeping at most `top_n` hits.
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize)
    -> Result<Vec<RerankHit>>;
}

/// A no-op reranker that keeps the vector-search order.
///
/// Useful for local runs against the in-memory index, where no rerank service
/// is available. Every hit gets a score of `0.0`.
///
/// # Example
///
/// ```rust,ignore
/// use flowbot_rag::NoOpReranker;
///
/// let hits = NoOpReranker.rerank("query", &documents, 4).await?;
/// // hits[i].index == i
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReranker;

#[async_trait]
impl Reranker for NoOpReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        Ok(documents
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(index, text)| RerankHit { index, text: text.clone(), score: 0.0 })
            .collect())
    }
}
