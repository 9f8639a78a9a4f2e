//! Data types for vector matches and rerank results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key holding the chunk body text.
pub const ORIGINAL_TEXT_KEY: &str = "original_text";
/// Metadata key holding the contextual summary written at indexing time.
pub const CONTEXTUAL_SUMMARY_KEY: &str = "contextual_summary";
/// Metadata key holding the uploaded file name.
pub const SOURCE_FILE_KEY: &str = "source_file";
/// Metadata key holding the parent document identifier.
pub const DOCUMENT_ID_KEY: &str = "document_id";

/// A nearest-neighbor hit returned by a [`VectorStore`](crate::VectorStore).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalMatch {
    /// Identifier of the stored vector.
    pub id: String,
    /// The similarity score (higher is more relevant, not bounded).
    pub score: f32,
    /// Key-value metadata stored alongside the vector.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RetrievalMatch {
    /// Look up a metadata field, treating blank values as absent.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    /// The text sent to the reranker for this match.
    ///
    /// Prefers the contextual summary and falls back to the body text.
    pub fn rerank_text(&self) -> &str {
        self.field(CONTEXTUAL_SUMMARY_KEY).or_else(|| self.field(ORIGINAL_TEXT_KEY)).unwrap_or("")
    }
}

/// One entry of a rerank response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankHit {
    /// Position of the document in the list sent to the reranker.
    pub index: usize,
    /// The document text echoed back by the reranker.
    pub text: String,
    /// Relevance score assigned by the reranker.
    pub score: f32,
}

/// A [`RetrievalMatch`] paired with its rerank score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankedMatch {
    /// The vector-search hit this result came from.
    pub original_match: RetrievalMatch,
    /// Rank of the hit in the vector-search response (0-based).
    pub vector_rank: usize,
    /// Relevance score assigned by the reranker.
    pub rerank_score: f32,
}

/// Sort reranked matches by descending rerank score.
///
/// The sort is stable, so equal scores keep their vector-search order.
pub fn sort_by_rerank_score(matches: &mut [RerankedMatch]) {
    matches.sort_by(|a, b| {
        b.rerank_score
            .partial_cmp(&a.rerank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.vector_rank.cmp(&b.vector_rank))
    });
}
