//! Vector index trait for nearest-neighbor search.

use async_trait::async_trait;

use crate::document::RetrievalMatch;
use crate::error::Result;

/// A namespaced vector index queried by similarity.
///
/// Indexing is owned by the document-upload side of FlowBot; the chat core
/// only reads. Namespaces isolate one knowledge base's vectors from another's.
///
/// # Example
///
/// ```rust,ignore
/// use flowbot_rag::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// let matches = store.query("default", &query_embedding, 9).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the `top_k` nearest neighbors of `embedding` in `namespace`,
    /// metadata included.
    ///
    /// Results are ordered by descending similarity score. An unknown or
    /// empty namespace yields an empty list.
    async fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalMatch>>;
}
