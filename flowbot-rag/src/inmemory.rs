//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps vectors in a `HashMap` per namespace behind a
//! `tokio::sync::RwLock`. It backs local runs of the console and the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::RetrievalMatch;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

#[derive(Debug, Clone)]
struct StoredVector {
    embedding: Vec<f32>,
    metadata: HashMap<String, String>,
}

/// An in-memory, namespaced vector index.
///
/// Namespaces are stored as nested maps: namespace → vector ID → vector.
///
/// # Example
///
/// ```rust,ignore
/// use flowbot_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.insert("default", "doc_1_chunk_0", vec![0.1, 0.9], metadata).await?;
/// let matches = store.query("default", &[0.1, 0.8], 9).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    namespaces: RwLock<HashMap<String, HashMap<String, StoredVector>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vector in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::VectorStoreError`] when the embedding is empty or its
    /// length differs from vectors already stored in the namespace.
    pub async fn insert(
        &self,
        namespace: &str,
        id: impl Into<String>,
        embedding: Vec<f32>,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        if embedding.is_empty() {
            return Err(Self::err("embedding must not be empty"));
        }
        let mut namespaces = self.namespaces.write().await;
        let store = namespaces.entry(namespace.to_string()).or_default();
        if let Some(existing) = store.values().next() {
            if existing.embedding.len() != embedding.len() {
                return Err(Self::err(format!(
                    "dimension mismatch in namespace '{namespace}': expected {}, got {}",
                    existing.embedding.len(),
                    embedding.len()
                )));
            }
        }
        store.insert(id.into(), StoredVector { embedding, metadata });
        Ok(())
    }

    /// Number of vectors stored in `namespace`.
    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces.read().await.get(namespace).map_or(0, HashMap::len)
    }

    fn err(message: impl Into<String>) -> RagError {
        RagError::VectorStoreError { backend: "InMemory".to_string(), message: message.into() }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalMatch>> {
        let namespaces = self.namespaces.read().await;
        let Some(store) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<RetrievalMatch> = store
            .iter()
            .map(|(id, stored)| RetrievalMatch {
                id: id.clone(),
                score: cosine_similarity(&stored.embedding, embedding),
                metadata: stored.metadata.clone(),
            })
            .collect();

        // Sort by id first so equal scores come back in a stable order.
        scored.sort_by(|a, b| a.id.cmp(&b.id));
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
