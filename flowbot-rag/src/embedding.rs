//! Embedding client trait: text in, fixed-length vector out.

use async_trait::async_trait;

use crate::error::Result;

/// Turns query text into a vector for nearest-neighbor search.
///
/// One provider is bound to one model, so every vector it returns has
/// [`dimensions`](EmbeddingProvider::dimensions) components. The vector index
/// being queried must have been built with the same model.
///
/// # Example
///
/// ```rust,ignore
/// use flowbot_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("What is the refund policy?").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Model identifier, used in log fields.
    fn model(&self) -> &str;
}
